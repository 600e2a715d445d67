use std::{sync::Arc, time::Duration};

use mc_api::types::{ChatOutcome, ChatRequest};
use mc_conversation::{ToolCall, Transcript, Turn};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{AnnotationId, AuthGate, Epoch, Error, Result, View};

/// Where the pipeline is in a request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,

    /// The user turn is being recorded.
    Sending,

    /// The chat request is outstanding.
    AwaitingReply,
}

/// How a call to [`MessagePipeline::submit`] ended.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Nothing was sent: the text was blank, or a cycle was already running.
    Ignored,

    /// The assistant replied with this turn.
    Answered(Turn),

    /// The cycle failed. A system turn describing `0` was appended.
    Failed(Error),

    /// The session was reset while the request was outstanding, so its
    /// result was discarded.
    Discarded,
}

#[derive(Debug, Default)]
struct State {
    phase: Phase,
    transcript: Transcript,
}

/// Owns the transcript and runs one request/response cycle at a time.
pub struct MessagePipeline {
    gate: Arc<AuthGate>,
    view: Arc<dyn View>,
    epoch: Epoch,
    annotation_delay: Duration,
    state: Mutex<State>,
}

impl MessagePipeline {
    pub fn new(
        gate: Arc<AuthGate>,
        view: Arc<dyn View>,
        epoch: Epoch,
        annotation_delay: Duration,
    ) -> Self {
        Self {
            gate,
            view,
            epoch,
            annotation_delay,
            state: Mutex::new(State::default()),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    #[must_use]
    pub fn transcript(&self) -> Transcript {
        self.state.lock().transcript.clone()
    }

    /// Send `text` as a user turn and wait for the reply.
    ///
    /// Blank text, or a call while another cycle is running, is ignored. The
    /// user turn is appended and the pending indicator shown before the
    /// request goes out. Afterwards the indicator is removed and exactly one
    /// assistant or system turn is appended.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            trace!("Ignoring blank message.");
            return SubmitOutcome::Ignored;
        }

        let Some((epoch, request)) = self.begin(text) else {
            debug!("A message is already being processed, ignoring submit.");
            return SubmitOutcome::Ignored;
        };

        let result = self
            .gate
            .request(|backend| async move { backend.chat(&request).await })
            .await
            .and_then(|reply| match reply.into_outcome() {
                ChatOutcome::Answer { text, tool_calls } => Ok((text, tool_calls)),
                ChatOutcome::Failed(Some(message)) => Err(Error::Application(message)),
                ChatOutcome::Failed(None) | ChatOutcome::Empty => Err(Error::EmptyReply),
            });

        self.finish(epoch, result)
    }

    /// Enter `Sending`, record the user turn and enter `AwaitingReply`.
    fn begin(&self, text: &str) -> Option<(u64, ChatRequest)> {
        let mut state = self.state.lock();
        if state.phase != Phase::Idle {
            return None;
        }

        state.phase = Phase::Sending;

        let request = ChatRequest::new(text, state.transcript.turns());
        let turn = Turn::user(text);

        self.view.append_turn(&turn, None);
        state.transcript.push(turn);

        self.view.set_input("");
        self.view.set_submit_enabled(false);
        self.view.show_pending();

        state.phase = Phase::AwaitingReply;
        trace!(history = request.history.len(), "Sending message.");

        Some((self.epoch.current(), request))
    }

    fn finish(&self, epoch: u64, result: Result<(String, Vec<ToolCall>)>) -> SubmitOutcome {
        let mut state = self.state.lock();
        if !self.epoch.is_current(epoch) {
            debug!("Session was reset while awaiting a reply, discarding it.");
            return SubmitOutcome::Discarded;
        }

        self.view.remove_pending();

        let outcome = match result {
            Ok((text, tool_calls)) => {
                let turn = Turn::assistant(text, tool_calls);
                let annotation = (!turn.tool_calls.is_empty())
                    .then(|| AnnotationId(state.transcript.len()));

                self.view.append_turn(&turn, annotation);
                state.transcript.push(turn.clone());

                if let Some(id) = annotation {
                    self.schedule_dim(epoch, id);
                }

                SubmitOutcome::Answered(turn)
            }
            Err(error) => {
                warn!(%error, "Message failed.");

                let turn = Turn::system(error.user_message());
                self.view.append_turn(&turn, None);
                state.transcript.push(turn);

                SubmitOutcome::Failed(error)
            }
        };

        state.phase = Phase::Idle;
        self.view.set_submit_enabled(true);

        outcome
    }

    /// De-emphasize the annotation `id` once the annotation delay has passed,
    /// unless the session is reset before then.
    fn schedule_dim(&self, epoch: u64, id: AnnotationId) {
        let view = Arc::clone(&self.view);
        let current = self.epoch.clone();
        let delay = self.annotation_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.is_current(epoch) {
                view.dim_annotation(id);
            }
        });
    }

    /// Drop the transcript and any outstanding cycle.
    pub fn reset(&self) {
        self.epoch.bump();

        let mut state = self.state.lock();
        let pending = state.phase != Phase::Idle;
        state.transcript.clear();
        state.phase = Phase::Idle;

        if pending {
            self.view.remove_pending();
            self.view.set_submit_enabled(true);
        }
        self.view.clear_transcript();
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
