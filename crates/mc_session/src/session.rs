use std::{sync::Arc, time::Duration};

use mc_api::types::{Capability, Credentials};
use mc_config::{AppConfig, AuthMode};
use mc_conversation::Transcript;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::{
    AuthGate, AuthState, Backend, CapabilityLoader, Connectivity, Epoch, LoginOutcome,
    MessagePipeline, Result, StatusPoller, SubmitOutcome, View,
};

/// Settings of a [`ChatSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub auth_mode: AuthMode,

    /// How long tool-call annotations stay emphasized.
    pub annotation_delay: Duration,

    /// Connectivity poll period. `None` disables polling.
    pub status_poll_interval: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auth_mode: AuthMode::default(),
            annotation_delay: Duration::from_secs(3),
            status_poll_interval: Some(Duration::from_secs(30)),
        }
    }
}

impl From<&AppConfig> for SessionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            auth_mode: config.auth.mode,
            annotation_delay: config.chat.annotation_delay(),
            status_poll_interval: config.chat.status_poll_interval(),
        }
    }
}

/// One run of the chat client.
pub struct ChatSession {
    gate: Arc<AuthGate>,
    capabilities: CapabilityLoader,
    pipeline: MessagePipeline,
    view: Arc<dyn View>,
    epoch: Epoch,
    poll_interval: Option<Duration>,
    poller: Mutex<Option<StatusPoller>>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn Backend>, view: Arc<dyn View>, config: SessionConfig) -> Self {
        let epoch = Epoch::default();
        let gate = Arc::new(AuthGate::new(backend, view.clone(), config.auth_mode));

        Self {
            capabilities: CapabilityLoader::new(gate.clone(), view.clone()),
            pipeline: MessagePipeline::new(
                gate.clone(),
                view.clone(),
                epoch.clone(),
                config.annotation_delay,
            ),
            gate,
            view,
            epoch,
            poll_interval: config.status_poll_interval,
            poller: Mutex::new(None),
        }
    }

    /// Check the session status and, if signed in, load the capability
    /// catalogue.
    ///
    /// Returns whether the user is signed in.
    pub async fn start(&self) -> bool {
        let authenticated = self.gate.check_status().await;
        if authenticated {
            self.on_authenticated().await;
        }

        authenticated
    }

    /// Log in. See [`AuthGate::login`].
    pub async fn login(&self, credentials: Option<Credentials>) -> Result<LoginOutcome> {
        let outcome = self.gate.login(credentials).await?;
        if outcome == LoginOutcome::SignedIn {
            self.on_authenticated().await;
        }

        Ok(outcome)
    }

    /// End the session.
    ///
    /// The transcript is emptied and the login view shown, whether or not the
    /// backend acknowledges the logout.
    pub async fn logout(&self) {
        self.stop_poller();
        self.pipeline.reset();
        self.capabilities.clear();
        self.gate.logout().await;
    }

    /// Submit a message. See [`MessagePipeline::submit`].
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        self.pipeline.submit(text).await
    }

    /// Reload the capability catalogue.
    pub async fn load_capabilities(&self) -> Result<Vec<Capability>> {
        self.capabilities.load().await
    }

    /// Pre-fill the input with the example of the capability at `index`.
    pub fn select_capability(&self, index: usize) -> Option<Capability> {
        self.capabilities.select(index)
    }

    /// Check tool-server connectivity now.
    pub async fn refresh_status(&self) -> Connectivity {
        StatusPoller::refresh(&self.gate, self.view.as_ref()).await
    }

    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        self.capabilities.capabilities()
    }

    #[must_use]
    pub fn transcript(&self) -> Transcript {
        self.pipeline.transcript()
    }

    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        self.gate.state()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.gate.is_authenticated()
    }

    #[must_use]
    pub fn pipeline(&self) -> &MessagePipeline {
        &self.pipeline
    }

    /// Stop background work and ignore any reply still outstanding.
    pub fn shutdown(&self) {
        debug!("Shutting down session.");
        self.stop_poller();
        self.epoch.bump();
    }

    async fn on_authenticated(&self) {
        // Failures are already shown in place of the catalogue.
        let _result = self.capabilities.load().await;

        if let Some(period) = self.poll_interval
            && self.gate.is_authenticated()
        {
            info!(?period, "Starting status poller.");
            let poller = StatusPoller::spawn(self.gate.clone(), self.view.clone(), period);
            if let Some(previous) = self.poller.lock().replace(poller) {
                previous.stop();
            }
        }
    }

    fn stop_poller(&self) {
        if let Some(poller) = self.poller.lock().take() {
            poller.stop();
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
