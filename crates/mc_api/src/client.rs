use std::{fmt, sync::Arc, time::Duration};

use parking_lot::RwLock;
use reqwest::{
    StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{error, trace};
use url::Url;

use crate::{
    Error, Result,
    types::{
        Acknowledgement, AuthStatus, CapabilitiesResponse, ChatReply, ChatRequest, Credentials,
        LoginRedirect, LoginResponse, McpStatus,
    },
};

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_USER_AGENT: &str = concat!("mcpchat/", env!("CARGO_PKG_VERSION"));

/// Typed client for the chat backend.
///
/// Cheap to clone; clones share the connection pool, the cookie jar and the
/// bearer token.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.has_token().then_some("[REDACTED]"))
            .finish_non_exhaustive()
    }
}

pub struct ClientBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl Client {
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder {
            base_url: DEFAULT_BASE_URL.to_owned(),
            token: None,
            timeout: None,
            user_agent: None,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Replace the bearer token sent with every request. `None` falls back to
    /// whatever session cookie the backend has set.
    pub fn set_token(&self, token: Option<String>) {
        *self.inner.token.write() = token;
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner.token.read().is_some()
    }

    /// `GET /api/auth/status`
    pub async fn auth_status(&self) -> Result<AuthStatus> {
        self.get_json("api/auth/status").await
    }

    /// `GET /api/auth/login`
    pub async fn login_url(&self) -> Result<LoginRedirect> {
        self.get_json("api/auth/login").await
    }

    /// `POST /api/auth/login`
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        self.post_json("api/auth/login", credentials).await
    }

    /// `POST /api/auth/logout`
    pub async fn logout(&self) -> Result<Acknowledgement> {
        self.post_json("api/auth/logout", &Value::Object(Default::default()))
            .await
    }

    /// `GET /api/capabilities`
    pub async fn capabilities(&self) -> Result<CapabilitiesResponse> {
        self.get_json("api/capabilities").await
    }

    /// `GET /api/mcp/status`
    pub async fn mcp_status(&self) -> Result<McpStatus> {
        self.get_json("api/mcp/status").await
    }

    /// `POST /api/chat`
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.post_json("api/chat", request).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.inner.base_url.join(path)?;
        let request = self.authorize(self.inner.http.get(url));

        self.send_json(request).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.inner.base_url.join(path)?;
        let request = self.authorize(self.inner.http.post(url).json(body));

        self.send_json(request).await
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.inner.token.read().as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_owned();

        trace!(
            %url,
            status = status.as_u16(),
            content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .map(|v| v.to_str().unwrap_or_default()),
            "Received response."
        );

        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized {
                message: error_message(&body),
            });
        }

        if !status.is_success() {
            error!(%url, status = status.as_u16(), body, "Unexpected response.");

            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(Into::into)
    }
}

/// Extracts the human-readable failure reason from an error body, if any.
fn error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;

    ["error", "message"]
        .into_iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_owned)
}

impl ClientBuilder {
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<Client> {
        // A trailing slash makes `Url::join` append to the path instead of
        // replacing its last segment.
        let mut base_url = Url::parse(self.base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))?,
        );

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|error| Error::Build(format!("{error:#}")))?;

        trace!(%base_url, has_token = self.token.is_some(), "Built backend client.");

        Ok(Client {
            inner: Arc::new(Inner {
                http,
                base_url,
                token: RwLock::new(self.token),
            }),
        })
    }
}
