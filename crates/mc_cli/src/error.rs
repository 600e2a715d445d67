use std::io;

use crate::cmd;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// CLI Error types
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("Command error: {0}")]
    Command(#[from] cmd::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] mc_config::Error),

    #[error("Backend error: {0}")]
    Api(#[from] mc_api::Error),

    #[error("{0}")]
    Session(#[from] mc_session::Error),

    #[error("Not logged in.")]
    NotAuthenticated,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Inquire(#[from] inquire::InquireError),
}
