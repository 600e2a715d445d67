use std::sync::Arc;

use mc_api::types::Capability;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::{AuthGate, Error, Result, View};

/// Fetches the capability catalogue and turns a selection into a draft
/// message.
pub struct CapabilityLoader {
    gate: Arc<AuthGate>,
    view: Arc<dyn View>,
    capabilities: RwLock<Vec<Capability>>,
}

impl CapabilityLoader {
    pub fn new(gate: Arc<AuthGate>, view: Arc<dyn View>) -> Self {
        Self {
            gate,
            view,
            capabilities: RwLock::new(vec![]),
        }
    }

    /// Fetch the catalogue, replacing whatever was loaded before.
    ///
    /// On failure the catalogue is left empty and the error shown in its
    /// place.
    pub async fn load(&self) -> Result<Vec<Capability>> {
        let result = self
            .gate
            .request(|backend| async move { backend.capabilities().await })
            .await
            .and_then(|response| match response.error {
                Some(error) => Err(Error::Application(error)),
                None => Ok(response.capabilities),
            });

        match result {
            Ok(capabilities) => {
                debug!(count = capabilities.len(), "Loaded capabilities.");

                self.view.show_capabilities(&capabilities);
                self.capabilities.write().clone_from(&capabilities);
                Ok(capabilities)
            }
            Err(error) => {
                warn!(%error, "Failed to load capabilities.");

                self.capabilities.write().clear();
                match error {
                    Error::AuthRequired => self.view.clear_capabilities(),
                    _ => self.view.show_capabilities_error(error.user_message()),
                }
                Err(error)
            }
        }
    }

    /// Put the example prompt of the capability at `index` in the input.
    ///
    /// Nothing is sent. Returns `None` if there is no such capability.
    pub fn select(&self, index: usize) -> Option<Capability> {
        let capability = self.capabilities.read().get(index).cloned()?;

        debug!(name = %capability.name, "Selected capability.");
        self.view.set_input(&capability.example);

        Some(capability)
    }

    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        self.capabilities.read().clone()
    }

    pub fn clear(&self) {
        self.capabilities.write().clear();
        self.view.clear_capabilities();
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use mc_api::types::CapabilitiesResponse;
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::{
        RecordingView,
        mock::{MockBackend, capability, unauthorized},
    };

    fn setup(backend: MockBackend) -> (Arc<MockBackend>, Arc<RecordingView>, CapabilityLoader) {
        let backend = Arc::new(backend);
        let view = Arc::new(RecordingView::default());
        let gate = Arc::new(AuthGate::new(
            backend.clone(),
            view.clone(),
            mc_config::AuthMode::Redirect,
        ));

        (backend, view.clone(), CapabilityLoader::new(gate, view))
    }

    #[test(tokio::test)]
    async fn test_load_replaces_catalogue() {
        let (backend, view, loader) = setup(MockBackend::new());
        backend.push_capabilities(Ok(CapabilitiesResponse {
            capabilities: vec![capability("calculate", "What is 2+2?")],
            error: None,
        }));
        backend.push_capabilities(Ok(CapabilitiesResponse {
            capabilities: vec![
                capability("integrate", "Integrate x^2"),
                capability("differentiate", "Differentiate x^2"),
            ],
            error: None,
        }));

        loader.load().await.unwrap();
        let loaded = loader.load().await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loader.capabilities(), loaded);
        assert_eq!(view.capabilities(), loaded);
    }

    #[test(tokio::test)]
    async fn test_error_field_empties_catalogue() {
        let (backend, view, loader) = setup(MockBackend::new());
        backend.push_capabilities(Ok(CapabilitiesResponse {
            capabilities: vec![capability("calculate", "What is 2+2?")],
            error: None,
        }));
        backend.push_capabilities(Ok(CapabilitiesResponse {
            capabilities: vec![capability("stale", "")],
            error: Some("MCP server unavailable".to_owned()),
        }));

        loader.load().await.unwrap();
        let error = loader.load().await.unwrap_err();

        assert_eq!(error, Error::Application("MCP server unavailable".to_owned()));
        assert!(loader.capabilities().is_empty());
        assert_eq!(
            view.capabilities_error().as_deref(),
            Some("MCP server unavailable")
        );
    }

    #[test(tokio::test)]
    async fn test_transport_error_shows_generic_message() {
        let (backend, view, loader) = setup(MockBackend::new());
        backend.push_capabilities(Err(mc_api::Error::Api {
            status: 502,
            message: None,
        }));

        assert_matches!(loader.load().await, Err(Error::Transport(_)));
        assert_eq!(
            view.capabilities_error().as_deref(),
            Some(crate::error::CONNECTION_ERROR)
        );
    }

    #[test(tokio::test)]
    async fn test_unauthorized_shows_login() {
        let (backend, view, loader) = setup(MockBackend::new());
        backend.push_capabilities(Err(unauthorized()));

        assert_matches!(loader.load().await, Err(Error::AuthRequired));
        assert_eq!(view.screen(), crate::Screen::Login);
        assert_eq!(view.capabilities_error(), None);
    }

    #[test(tokio::test)]
    async fn test_expired_session_drops_shown_catalogue() {
        let (backend, view, loader) = setup(MockBackend::new());
        backend.push_capabilities(Ok(CapabilitiesResponse {
            capabilities: vec![capability("calculate", "What is 2+2?")],
            error: None,
        }));
        backend.push_capabilities(Err(unauthorized()));

        loader.load().await.unwrap();
        assert_eq!(view.capabilities().len(), 1);

        assert_matches!(loader.load().await, Err(Error::AuthRequired));
        assert!(loader.capabilities().is_empty());
        assert!(view.capabilities().is_empty());
        assert_eq!(view.capabilities_error(), None);
        assert_eq!(loader.select(0), None);
    }

    #[test(tokio::test)]
    async fn test_clear_empties_view() {
        let (backend, view, loader) = setup(MockBackend::new());
        backend.push_capabilities(Ok(CapabilitiesResponse {
            capabilities: vec![capability("calculate", "What is 2+2?")],
            error: None,
        }));
        loader.load().await.unwrap();

        loader.clear();

        assert!(loader.capabilities().is_empty());
        assert!(view.capabilities().is_empty());
        assert_eq!(
            view.events().last(),
            Some(&crate::ViewEvent::ClearCapabilities)
        );
    }

    #[test(tokio::test)]
    async fn test_select_fills_input() {
        let (backend, view, loader) = setup(MockBackend::new());
        backend.push_capabilities(Ok(CapabilitiesResponse {
            capabilities: vec![
                capability("calculate", "What is 2+2?"),
                capability("integrate", "Integrate x^2"),
            ],
            error: None,
        }));
        loader.load().await.unwrap();

        let selected = loader.select(1).unwrap();

        assert_eq!(selected.name, "integrate");
        assert_eq!(view.input(), "Integrate x^2");
        assert_eq!(loader.select(2), None);
        assert!(backend.chat_requests().is_empty());
    }
}
