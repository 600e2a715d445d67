//! Backend connection settings.

use std::time::Duration;

use schematic::Config;
use serde::Serialize;

use crate::{
    Result,
    assignment::{AssignKeyValue, KvAssignment, missing_key},
};

/// Environment variable overriding [`ServerConfig::base_url`].
pub const BASE_URL_ENV: &str = "MCPCHAT_BASE_URL";

/// Where the chat backend lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Serialize, Config)]
#[config(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Base URL of the backend. The `/api/...` paths are resolved against it.
    #[setting(default = "http://localhost:3000", env = "MCPCHAT_BASE_URL")]
    pub base_url: String,

    /// Per-request timeout, in seconds. `0` disables the timeout.
    #[setting(default = 30)]
    pub timeout_secs: u64,

    /// Overrides the default `User-Agent` header.
    pub user_agent: Option<String>,
}

impl ServerConfig {
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl AssignKeyValue for ServerConfig {
    fn assign(&mut self, kv: KvAssignment) -> Result<()> {
        match kv.key_string().as_str() {
            "base_url" => self.base_url = kv.try_string()?,
            "timeout_secs" => self.timeout_secs = kv.try_u64()?,
            "user_agent" => self.user_agent = kv.try_some_string()?,
            _ => return missing_key(&kv),
        }

        Ok(())
    }
}
