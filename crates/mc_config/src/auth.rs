//! Authentication settings.

use std::env;

use schematic::{Config, ConfigEnum};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    assignment::{AssignKeyValue, KvAssignment, missing_key},
};

/// Environment variable overriding [`AuthConfig::mode`]. Applied by
/// [`load`](crate::load).
pub const AUTH_MODE_ENV: &str = "MCPCHAT_AUTH_MODE";

#[derive(Debug, Clone, PartialEq, Serialize, Config)]
#[config(rename_all = "snake_case")]
pub struct AuthConfig {
    /// How to log in when the backend reports no session.
    #[setting(default)]
    pub mode: AuthMode,

    /// Name of the environment variable holding a preset bearer token.
    #[setting(default = "MCPCHAT_TOKEN")]
    pub token_env: String,

    /// Username offered when prompting for credentials.
    pub username: Option<String>,
}

impl AuthConfig {
    /// The preset bearer token, if the configured variable holds one.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

impl AssignKeyValue for AuthConfig {
    fn assign(&mut self, kv: KvAssignment) -> Result<()> {
        match kv.key_string().as_str() {
            "mode" => self.mode = kv.try_from_str()?,
            "token_env" => self.token_env = kv.try_string()?,
            "username" => self.username = kv.try_some_string()?,
            _ => return missing_key(&kv),
        }

        Ok(())
    }
}

/// The login flow the backend supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ConfigEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// The backend hands out an identity-provider URL the user has to visit.
    #[default]
    Redirect,

    /// The backend accepts a username and password directly.
    Credentials,
}
