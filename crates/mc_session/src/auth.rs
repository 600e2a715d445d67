use std::{future::Future, sync::Arc};

use mc_api::types::{Credentials, User};
use mc_config::AuthMode;
use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use crate::{Backend, Error, Result, View, error::SESSION_EXPIRED};

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// What the client knows about the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub authenticated: bool,
    pub user: Option<User>,
}

/// How a login attempt concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The user has to finish logging in at the identity provider.
    Redirect(String),

    /// The session is established.
    SignedIn,
}

/// Tracks the session and guards every backend call.
pub struct AuthGate {
    backend: Arc<dyn Backend>,
    view: Arc<dyn View>,
    mode: AuthMode,
    state: RwLock<AuthState>,
}

impl AuthGate {
    pub fn new(backend: Arc<dyn Backend>, view: Arc<dyn View>, mode: AuthMode) -> Self {
        Self {
            backend,
            view,
            mode,
            state: RwLock::new(AuthState::default()),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.read().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().authenticated
    }

    /// Ask the backend whether the session is valid and show the matching
    /// view. Any failure counts as signed out.
    pub async fn check_status(&self) -> bool {
        match self.backend.auth_status().await {
            Ok(status) if status.authenticated => {
                self.sign_in(status.user);
                true
            }
            Ok(_) => {
                debug!("No active session.");
                self.sign_out(None);
                false
            }
            Err(error) => {
                warn!(%error, "Failed to check session status.");
                self.sign_out(None);
                false
            }
        }
    }

    /// Start a login, the way the configured [`AuthMode`] dictates.
    ///
    /// In redirect mode the view is handed the identity-provider URL. In
    /// credentials mode `credentials` are submitted and, when accepted, the
    /// session is established. Failures are shown on the login view.
    pub async fn login(&self, credentials: Option<Credentials>) -> Result<LoginOutcome> {
        let result = match self.mode {
            AuthMode::Redirect => self.login_redirect().await,
            AuthMode::Credentials => self.login_credentials(credentials).await,
        };

        if let Err(error) = &result {
            warn!(%error, "Login failed.");
            self.view.show_login(Some(error.user_message()));
        }

        result
    }

    async fn login_redirect(&self) -> Result<LoginOutcome> {
        let redirect = self.backend.login_url().await?;

        info!(url = %redirect.redirect, "Redirecting to identity provider.");
        self.view.redirect(&redirect.redirect);

        Ok(LoginOutcome::Redirect(redirect.redirect))
    }

    async fn login_credentials(&self, credentials: Option<Credentials>) -> Result<LoginOutcome> {
        let credentials = credentials.ok_or(Error::MissingCredentials)?;
        trace!(username = %credentials.username, "Submitting credentials.");

        let response = self
            .backend
            .login(&credentials)
            .await
            .map_err(|error| match error {
                error if error.is_unauthorized() => Error::Application(INVALID_CREDENTIALS.to_owned()),
                error => error.into(),
            })?;
        if !response.success {
            return Err(Error::Application(
                response
                    .error
                    .unwrap_or_else(|| INVALID_CREDENTIALS.to_owned()),
            ));
        }

        if let Some(token) = response.token.filter(|t| !t.is_empty()) {
            self.backend.set_token(Some(token));
        }

        if self.check_status().await {
            Ok(LoginOutcome::SignedIn)
        } else {
            Err(Error::Application(
                "Login was accepted, but no session was established.".to_owned(),
            ))
        }
    }

    /// End the session. Local state is cleared and the login view shown even
    /// if the backend cannot be reached.
    pub async fn logout(&self) {
        if let Err(error) = self.backend.logout().await {
            warn!(%error, "Logout request failed, clearing local session anyway.");
        }

        self.backend.set_token(None);
        self.sign_out(None);
        info!("Logged out.");
    }

    /// Run `call` against the backend.
    ///
    /// An unauthorized response ends the session: the login view is shown and
    /// [`Error::AuthRequired`] returned in place of the response.
    pub async fn request<T, F, Fut>(&self, call: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn Backend>) -> Fut,
        Fut: Future<Output = mc_api::Result<T>>,
    {
        match call(Arc::clone(&self.backend)).await {
            Ok(value) => Ok(value),
            Err(error) if error.is_unauthorized() => {
                warn!(%error, "Backend rejected the session.");
                self.expire();
                Err(Error::AuthRequired)
            }
            Err(error) => Err(error.into()),
        }
    }

    fn expire(&self) {
        self.backend.set_token(None);
        self.sign_out(Some(SESSION_EXPIRED));
    }

    fn sign_in(&self, user: Option<User>) {
        info!(
            user = user.as_ref().and_then(User::display_name),
            "Session is active."
        );

        self.view.show_main(user.as_ref());
        *self.state.write() = AuthState {
            authenticated: true,
            user,
        };
    }

    fn sign_out(&self, error: Option<&str>) {
        *self.state.write() = AuthState::default();
        self.view.show_login(error);
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
