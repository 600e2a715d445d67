use async_trait::async_trait;
use mc_api::{
    Client, Result,
    types::{
        Acknowledgement, AuthStatus, CapabilitiesResponse, ChatReply, ChatRequest, Credentials,
        LoginRedirect, LoginResponse, McpStatus,
    },
};

/// The backend endpoints the session talks to.
///
/// Implemented by [`mc_api::Client`], and by
/// [`MockBackend`](crate::mock::MockBackend) for tests.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn auth_status(&self) -> Result<AuthStatus>;

    async fn login_url(&self) -> Result<LoginRedirect>;

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse>;

    async fn logout(&self) -> Result<Acknowledgement>;

    async fn capabilities(&self) -> Result<CapabilitiesResponse>;

    async fn mcp_status(&self) -> Result<McpStatus>;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply>;

    /// Replace the bearer token attached to later requests.
    fn set_token(&self, token: Option<String>);
}

#[async_trait]
impl Backend for Client {
    async fn auth_status(&self) -> Result<AuthStatus> {
        Self::auth_status(self).await
    }

    async fn login_url(&self) -> Result<LoginRedirect> {
        Self::login_url(self).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        Self::login(self, credentials).await
    }

    async fn logout(&self) -> Result<Acknowledgement> {
        Self::logout(self).await
    }

    async fn capabilities(&self) -> Result<CapabilitiesResponse> {
        Self::capabilities(self).await
    }

    async fn mcp_status(&self) -> Result<McpStatus> {
        Self::mcp_status(self).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        Self::chat(self, request).await
    }

    fn set_token(&self, token: Option<String>) {
        Self::set_token(self, token);
    }
}
