//! Wire types of the chat backend.

use std::fmt;

use mc_conversation::{Role, ToolCall, Turn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Response of `GET /api/auth/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub authenticated: bool,

    #[serde(default)]
    pub user: Option<User>,
}

/// The identity-provider profile attached to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Subject identifier issued by the identity provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Any other profile claims, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// The most human-friendly identifier available.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        [&self.name, &self.nickname, &self.email, &self.sub]
            .into_iter()
            .find_map(|v| v.as_deref().filter(|v| !v.trim().is_empty()))
    }
}

/// Response of `GET /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRedirect {
    /// Identity-provider URL the user has to visit.
    #[serde(alias = "url")]
    pub redirect: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Response of `POST /api/auth/login`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `POST /api/auth/logout`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub success: Option<bool>,
}

/// A tool the backend can use, with an example prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub example: String,
}

/// Response of `GET /api/capabilities`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub capabilities: Vec<Capability>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `GET /api/mcp/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpStatus {
    /// `connected`, `not_authenticated`, or a backend-specific state.
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,

    /// Every turn that preceded `message`, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl ChatRequest {
    #[must_use]
    pub fn new<'a>(message: impl Into<String>, history: impl IntoIterator<Item = &'a Turn>) -> Self {
        Self {
            message: message.into(),
            history: history.into_iter().map(HistoryEntry::from).collect(),
        }
    }
}

/// A prior turn as sent to the backend for context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl From<&Turn> for HistoryEntry {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            content: turn.text.clone(),
        }
    }
}

/// Response of `POST /api/chat`.
///
/// Backends disagree on the field carrying the reply text, so both `message`
/// and `response` are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tool_calls: Vec<ToolCall>,
}

/// What a [`ChatReply`] amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The assistant answered.
    Answer {
        text: String,
        tool_calls: Vec<ToolCall>,
    },

    /// The backend reported a failure. `None` when it gave no reason.
    Failed(Option<String>),

    /// The body had neither an answer nor an error.
    Empty,
}

impl ChatReply {
    #[must_use]
    pub fn into_outcome(self) -> ChatOutcome {
        if let Some(error) = self.error {
            return ChatOutcome::Failed(Some(error));
        }

        let text = self.response.or(self.message);
        match (self.success, text) {
            (Some(false), text) => ChatOutcome::Failed(text),
            (_, Some(text)) => ChatOutcome::Answer {
                text,
                tool_calls: self.tool_calls,
            },
            (_, None) => ChatOutcome::Empty,
        }
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
