pub mod assignment;
pub mod auth;
pub mod capabilities;
pub mod chat;
mod config;
mod error;
pub mod fs;
pub mod server;
pub mod style;

pub use assignment::{AssignKeyValue, KvAssignment};
pub use auth::AuthMode;
pub use config::{AppConfig, PartialAppConfig};
pub use error::{Error, Result};
pub use fs::{ConfigSources, global_config_path, load};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
