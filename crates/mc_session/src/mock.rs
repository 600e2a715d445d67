//! Scripted backend for testing sessions without a server.
//!
//! Each endpoint answers from its own queue of scripted results, falling back
//! to a fixed default once the queue is drained:
//!
//! | endpoint       | default                                  |
//! |----------------|------------------------------------------|
//! | `auth_status`  | not authenticated                        |
//! | `login_url`    | [`MockBackend::LOGIN_URL`]               |
//! | `login`        | rejected                                 |
//! | `logout`       | accepted                                 |
//! | `capabilities` | empty catalogue                          |
//! | `mcp_status`   | connected                                |
//! | `chat`         | a `500` backend error                    |
//!
//! Every call is recorded, see [`MockBackend::calls`].

use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use mc_api::{
    Error, Result,
    types::{
        Acknowledgement, AuthStatus, CapabilitiesResponse, Capability, ChatReply, ChatRequest,
        Credentials, LoginRedirect, LoginResponse, McpStatus, User,
    },
};
use mc_conversation::ToolCall;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::Backend;

/// A call received by a [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AuthStatus,
    LoginUrl,
    Login { username: String },
    Logout,
    Capabilities,
    McpStatus,
    Chat(ChatRequest),
    SetToken(Option<String>),
}

type Queue<T> = Mutex<VecDeque<Result<T>>>;

#[derive(Debug, Default)]
pub struct MockBackend {
    auth_status: Queue<AuthStatus>,
    login_url: Queue<LoginRedirect>,
    login: Queue<LoginResponse>,
    logout: Queue<Acknowledgement>,
    capabilities: Queue<CapabilitiesResponse>,
    mcp_status: Queue<McpStatus>,
    chat: Queue<ChatReply>,

    calls: Mutex<Vec<Call>>,
    token: Mutex<Option<String>>,

    /// When set, chat requests wait for a permit before answering.
    chat_gate: Option<Arc<Semaphore>>,
}

impl MockBackend {
    pub const LOGIN_URL: &str = "https://idp.example.com/authorize";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an authenticated session for `name` on every status check.
    #[must_use]
    pub fn signed_in(self, name: &str) -> Self {
        self.always_signed_in(name);
        self
    }

    /// Hold every chat request until [`MockBackend::release_chat`] is called.
    #[must_use]
    pub fn with_chat_gate(mut self) -> Self {
        self.chat_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let one held chat request answer.
    pub fn release_chat(&self) {
        if let Some(gate) = &self.chat_gate {
            gate.add_permits(1);
        }
    }

    /// Replace the scripted status results with an authenticated session
    /// that never runs out.
    pub fn always_signed_in(&self, name: &str) {
        let mut queue = self.auth_status.lock();
        queue.clear();
        // Enough for any test.
        for _ in 0..64 {
            queue.push_back(Ok(signed_in_status(name)));
        }
    }

    pub fn push_auth_status(&self, result: Result<AuthStatus>) {
        self.auth_status.lock().push_back(result);
    }

    pub fn push_login_url(&self, result: Result<LoginRedirect>) {
        self.login_url.lock().push_back(result);
    }

    pub fn push_login(&self, result: Result<LoginResponse>) {
        self.login.lock().push_back(result);
    }

    pub fn push_logout(&self, result: Result<Acknowledgement>) {
        self.logout.lock().push_back(result);
    }

    pub fn push_capabilities(&self, result: Result<CapabilitiesResponse>) {
        self.capabilities.lock().push_back(result);
    }

    pub fn push_mcp_status(&self, result: Result<McpStatus>) {
        self.mcp_status.lock().push_back(result);
    }

    pub fn push_chat(&self, result: Result<ChatReply>) {
        self.chat.lock().push_back(result);
    }

    /// Script an assistant answer.
    pub fn push_answer(&self, text: &str, tool_calls: Vec<ToolCall>) {
        self.push_chat(Ok(ChatReply {
            success: Some(true),
            response: Some(text.to_owned()),
            tool_calls,
            ..Default::default()
        }));
    }

    /// Script a `401` on the next chat request.
    pub fn push_chat_unauthorized(&self) {
        self.push_chat(Err(unauthorized()));
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// The chat requests received so far.
    #[must_use]
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Chat(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

/// A `401` as the HTTP client reports it.
#[must_use]
pub fn unauthorized() -> Error {
    Error::Unauthorized {
        message: Some("Not authenticated".to_owned()),
    }
}

/// A capability with a description derived from its name.
#[must_use]
pub fn capability(name: &str, example: &str) -> Capability {
    Capability {
        name: name.to_owned(),
        description: format!("{name} things"),
        example: example.to_owned(),
    }
}

fn signed_in_status(name: &str) -> AuthStatus {
    AuthStatus {
        authenticated: true,
        user: Some(User {
            name: Some(name.to_owned()),
            ..Default::default()
        }),
    }
}

fn next<T>(queue: &Queue<T>, default: impl FnOnce() -> Result<T>) -> Result<T> {
    queue.lock().pop_front().unwrap_or_else(default)
}

#[async_trait]
impl Backend for MockBackend {
    async fn auth_status(&self) -> Result<AuthStatus> {
        self.record(Call::AuthStatus);
        next(&self.auth_status, || Ok(AuthStatus::default()))
    }

    async fn login_url(&self) -> Result<LoginRedirect> {
        self.record(Call::LoginUrl);
        next(&self.login_url, || {
            Ok(LoginRedirect {
                redirect: Self::LOGIN_URL.to_owned(),
            })
        })
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        self.record(Call::Login {
            username: credentials.username.clone(),
        });
        next(&self.login, || Ok(LoginResponse::default()))
    }

    async fn logout(&self) -> Result<Acknowledgement> {
        self.record(Call::Logout);
        next(&self.logout, || {
            Ok(Acknowledgement {
                success: Some(true),
            })
        })
    }

    async fn capabilities(&self) -> Result<CapabilitiesResponse> {
        self.record(Call::Capabilities);
        next(&self.capabilities, || Ok(CapabilitiesResponse::default()))
    }

    async fn mcp_status(&self) -> Result<McpStatus> {
        self.record(Call::McpStatus);
        next(&self.mcp_status, || {
            Ok(McpStatus {
                status: "connected".to_owned(),
                server_url: None,
            })
        })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.record(Call::Chat(request.clone()));

        if let Some(gate) = &self.chat_gate
            && let Ok(permit) = gate.acquire().await
        {
            permit.forget();
        }

        next(&self.chat, || {
            Err(Error::Api {
                status: 500,
                message: Some("no scripted reply".to_owned()),
            })
        })
    }

    fn set_token(&self, token: Option<String>) {
        self.record(Call::SetToken(token.clone()));
        *self.token.lock() = token;
    }
}
