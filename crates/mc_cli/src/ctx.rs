use std::{
    io::{self, IsTerminal as _},
    sync::Arc,
};

use mc_api::Client;
use mc_config::AppConfig;
use mc_md::ansi::Renderer;
use mc_session::{ChatSession, SessionConfig, View};
use tracing::debug;

use crate::{Globals, Result};

/// Context for the CLI application
pub(crate) struct Ctx {
    /// Merged file/env/CLI configuration.
    config: AppConfig,

    pub(crate) term: Term,

    /// Client for the chat backend.
    client: Client,
}

pub(crate) struct Term {
    /// Global CLI arguments.
    pub(crate) args: Globals,

    /// Whether or not stdout is connected to a TTY.
    ///
    /// If you pipe (|) or redirect (>) the output, stdout is connected to a
    /// pipe or a regular file, respectively. These are not managed by the TTY
    /// subsystem.
    pub(crate) is_tty: bool,
}

impl Ctx {
    pub(crate) fn new(args: Globals, config: AppConfig) -> Result<Self> {
        let server = &config.server;

        let mut builder = Client::builder()
            .base_url(&server.base_url)
            .token(config.auth.token());
        if let Some(timeout) = server.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &server.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder.build()?;
        debug!(base_url = %client.base_url(), "Using chat backend.");

        Ok(Self {
            config,
            term: Term {
                args,
                is_tty: io::stdout().is_terminal(),
            },
            client,
        })
    }

    /// Get immutable access to the configuration.
    pub(crate) const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Whether to emit colors and other terminal styling.
    pub(crate) const fn use_color(&self) -> bool {
        self.term.is_tty && self.term.args.colors && self.config.style.color
    }

    /// A renderer for assistant text, following the style configuration.
    pub(crate) fn renderer(&self) -> Renderer {
        Renderer::new()
            .color(self.use_color())
            .wrap_width(self.config.style.wrap_width)
            .theme(self.config.style.theme.as_deref())
    }

    /// Start a new session on `view`.
    ///
    /// `poll` enables the background connectivity poller, if configured.
    pub(crate) fn session(&self, view: Arc<dyn View>, poll: bool) -> ChatSession {
        let mut config = SessionConfig::from(&self.config);
        if !poll {
            config.status_poll_interval = None;
        }

        ChatSession::new(Arc::new(self.client.clone()), view, config)
    }
}
