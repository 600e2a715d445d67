use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{AuthGate, Connectivity, Error, View};

/// Re-checks tool-server connectivity in the background while the session
/// is authenticated.
///
/// The poller only ever updates the connectivity indicator. It stops when
/// the session ends, or when the poller is stopped or dropped.
#[derive(Debug)]
pub struct StatusPoller {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Start polling every `period`, beginning immediately.
    pub fn spawn(gate: Arc<AuthGate>, view: Arc<dyn View>, period: Duration) -> Self {
        let token = CancellationToken::new();
        let cancel = token.child_token();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        trace!("Status poller cancelled.");
                        break;
                    }
                    _ = interval.tick() => {}
                }

                if !gate.is_authenticated() {
                    break;
                }

                Self::refresh(&gate, view.as_ref()).await;
                if !gate.is_authenticated() {
                    debug!("Session ended, stopping status poller.");
                    break;
                }
            }
        });

        Self { token, handle }
    }

    /// Fetch the tool-server status once and show it.
    ///
    /// An unauthorized response ends the session, like any other call made
    /// through the gate. Other failures report the server as unreachable.
    pub async fn refresh(gate: &AuthGate, view: &dyn View) -> Connectivity {
        let connectivity = match gate
            .request(|backend| async move { backend.mcp_status().await })
            .await
        {
            Ok(status) => Connectivity::from(status),
            Err(Error::AuthRequired) => Connectivity::NotAuthenticated,
            Err(error) => {
                debug!(%error, "Status check failed.");
                Connectivity::Unreachable
            }
        };

        trace!(%connectivity, "Connectivity updated.");
        view.set_connectivity(&connectivity);
        connectivity
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
