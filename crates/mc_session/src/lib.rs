//! The chat session controller.
//!
//! A [`ChatSession`] lives for one run of the client. It is made of three
//! components sharing a [`Backend`] and a [`View`]:
//!
//! - the [`AuthGate`], which knows whether the user is signed in and is the
//!   only way the other components reach the backend,
//! - the [`CapabilityLoader`], which fetches the capability catalogue once
//!   the user is signed in,
//! - the [`MessagePipeline`], which owns the transcript and runs one
//!   request/response cycle at a time.

mod auth;
mod backend;
mod capabilities;
mod epoch;
mod error;
pub mod mock;
mod pipeline;
mod poller;
mod recording;
mod session;
mod view;

pub use auth::{AuthGate, AuthState, LoginOutcome};
pub use backend::Backend;
pub use capabilities::CapabilityLoader;
pub use epoch::Epoch;
pub use error::{Error, Result};
pub use pipeline::{MessagePipeline, Phase, SubmitOutcome};
pub use poller::StatusPoller;
pub use recording::{RecordingView, Screen, ViewEvent};
pub use session::{ChatSession, SessionConfig};
pub use view::{AnnotationId, Connectivity, View};
