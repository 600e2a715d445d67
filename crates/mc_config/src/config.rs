use schematic::Config;
use serde::Serialize;

use crate::{
    Result,
    assignment::{AssignKeyValue, KvAssignment, missing_key},
    auth::{AuthConfig, PartialAuthConfig},
    capabilities::{CapabilitiesConfig, PartialCapabilitiesConfig},
    chat::{ChatConfig, PartialChatConfig},
    server::{PartialServerConfig, ServerConfig},
    style::{PartialStyleConfig, StyleConfig},
};

/// The effective configuration of one `mcpchat` run.
#[derive(Debug, Clone, PartialEq, Serialize, Config)]
#[config(rename_all = "snake_case")]
pub struct AppConfig {
    #[setting(nested)]
    pub server: ServerConfig,

    #[setting(nested)]
    pub auth: AuthConfig,

    #[setting(nested)]
    pub chat: ChatConfig,

    #[setting(nested)]
    pub capabilities: CapabilitiesConfig,

    #[setting(nested)]
    pub style: StyleConfig,
}

impl AppConfig {
    /// Every assignable key, dot-delimited.
    #[must_use]
    pub fn fields() -> Vec<String> {
        [
            "server.base_url",
            "server.timeout_secs",
            "server.user_agent",
            "auth.mode",
            "auth.token_env",
            "auth.username",
            "chat.annotation_delay_ms",
            "chat.status_poll_secs",
            "capabilities.default_icon",
            "capabilities.icons",
            "style.color",
            "style.wrap_width",
            "style.theme",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect()
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(Into::into)
    }
}

impl AssignKeyValue for AppConfig {
    fn assign(&mut self, mut kv: KvAssignment) -> Result<()> {
        match kv.key_string().as_str() {
            _ if kv.p("server") => self.server.assign(kv)?,
            _ if kv.p("auth") => self.auth.assign(kv)?,
            _ if kv.p("chat") => self.chat.assign(kv)?,
            _ if kv.p("capabilities") => self.capabilities.assign(kv)?,
            _ if kv.p("style") => self.style.assign(kv)?,
            _ => return missing_key(&kv),
        }

        Ok(())
    }
}
