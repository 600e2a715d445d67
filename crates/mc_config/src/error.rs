use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Schematic error: {0}")]
    Schematic(#[from] Box<schematic::ConfigError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Unknown config key: {key}\n\nAvailable keys:\n  - {}", available_keys.join("\n  - "))]
    UnknownConfigKey {
        key: String,
        available_keys: Vec<String>,
    },

    #[error("Invalid config value \"{value}\" for key {key}. Expected {need}")]
    InvalidConfigValue {
        key: String,
        value: String,
        need: String,
    },

    #[error("Invalid config assignment \"{0}\", expected <key>=<value> or <key>:=<json>")]
    InvalidAssignment(String),
}

impl From<schematic::ConfigError> for Error {
    fn from(error: schematic::ConfigError) -> Self {
        Self::Schematic(Box::new(error))
    }
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}
