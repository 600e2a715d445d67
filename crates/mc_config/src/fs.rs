//! Configuration file discovery and layered loading.

use std::{env, path::PathBuf};

use directories::ProjectDirs;
use schematic::ConfigLoader;
use tracing::{debug, trace};

use crate::{
    AppConfig, Error, Result,
    assignment::{AssignKeyValue as _, KvAssignment, KvValue},
    auth::AUTH_MODE_ENV,
};

/// Application name for configuration file storage paths.
const APPLICATION: &str = "mcpchat";

/// Environment variable pointing at an alternative global configuration file.
pub const GLOBAL_CONFIG_ENV_VAR: &str = "MCPCHAT_GLOBAL_CONFIG_FILE";

/// The global configuration file, if a home directory can be determined.
///
/// [`GLOBAL_CONFIG_ENV_VAR`] takes precedence over the platform default
/// (`$XDG_CONFIG_HOME/mcpchat/config.toml` on Linux).
#[must_use]
pub fn global_config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(GLOBAL_CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }

    ProjectDirs::from("", "", APPLICATION).map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Where a configuration is assembled from, lowest precedence first.
///
/// Built-in defaults come first, then `global_file` (skipped when missing),
/// then `file` (required to exist), then environment variables, then
/// `overrides`.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub global_file: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub overrides: Vec<KvAssignment>,
}

impl ConfigSources {
    /// Sources with the platform's global configuration file.
    #[must_use]
    pub fn with_global() -> Self {
        Self {
            global_file: global_config_path(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    #[must_use]
    pub fn overrides(mut self, overrides: impl IntoIterator<Item = KvAssignment>) -> Self {
        self.overrides.extend(overrides);
        self
    }
}

/// Build the effective configuration from `sources`.
pub fn load(sources: ConfigSources) -> Result<AppConfig> {
    let mut loader = ConfigLoader::<AppConfig>::new();

    if let Some(path) = sources.global_file {
        trace!(path = %path.display(), "Looking for global configuration file.");
        loader.file_optional(path)?;
    }

    if let Some(path) = sources.file {
        if !path.is_file() {
            return Err(Error::MissingFile(path));
        }

        debug!(path = %path.display(), "Loading configuration file.");
        loader.file(path)?;
    }

    let mut config = loader.load()?.config;

    if let Some(mode) = env::var(AUTH_MODE_ENV).ok().filter(|v| !v.trim().is_empty()) {
        trace!(%mode, "Applying auth mode from environment.");
        let mode = KvValue::String(mode.trim().to_owned());
        config.assign(KvAssignment::new("auth.mode", mode))?;
    }

    for kv in sources.overrides {
        trace!(key = kv.full_key(), "Applying configuration override.");
        config.assign(kv)?;
    }

    debug!("Loaded configuration.");
    trace!(
        config = serde_json::to_string(&config).unwrap_or_default(),
        "Configuration details."
    );

    Ok(config)
}
