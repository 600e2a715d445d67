use std::fmt;

use mc_api::types::{Capability, McpStatus, User};
use mc_conversation::Turn;

/// Identifies the tool-call annotation of an assistant turn.
///
/// The id is the position of the turn in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationId(pub usize);

/// State of the tool server, as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connectivity {
    Connected { server_url: Option<String> },
    NotAuthenticated,

    /// Any other state the backend reports.
    Other(String),

    /// The backend could not be reached.
    Unreachable,
}

impl From<McpStatus> for Connectivity {
    fn from(status: McpStatus) -> Self {
        match status.status.as_str() {
            "connected" => Self::Connected {
                server_url: status.server_url,
            },
            "not_authenticated" => Self::NotAuthenticated,
            _ => Self::Other(status.status),
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected {
                server_url: Some(url),
            } => write!(f, "connected to {url}"),
            Self::Connected { server_url: None } => f.write_str("connected"),
            Self::NotAuthenticated => f.write_str("not authenticated"),
            Self::Other(status) => f.write_str(status),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// The presentation surface driven by a [`ChatSession`].
///
/// Calls are made synchronously from the session's tasks and must not call
/// back into the session.
///
/// [`ChatSession`]: crate::ChatSession
pub trait View: Send + Sync {
    /// Switch to the login view, with an optional error to display.
    fn show_login(&self, error: Option<&str>);

    /// Switch to the main view.
    fn show_main(&self, user: Option<&User>);

    /// Send the user to the identity provider.
    fn redirect(&self, url: &str);

    /// Replace the capability catalogue.
    fn show_capabilities(&self, capabilities: &[Capability]);

    /// Show an error in place of the capability catalogue.
    fn show_capabilities_error(&self, message: &str);

    /// Drop the capability catalogue without reporting an error, after a
    /// logout or an expired session.
    fn clear_capabilities(&self);

    /// Replace the content of the message input.
    fn set_input(&self, text: &str);

    fn set_submit_enabled(&self, enabled: bool);

    /// Append a turn to the transcript. `annotation` is set when the turn
    /// carries tool calls, which are shown emphasized until
    /// [`View::dim_annotation`] is called with the same id.
    fn append_turn(&self, turn: &Turn, annotation: Option<AnnotationId>);

    fn show_pending(&self);

    fn remove_pending(&self);

    fn dim_annotation(&self, id: AnnotationId);

    fn clear_transcript(&self);

    fn set_connectivity(&self, connectivity: &Connectivity);
}
