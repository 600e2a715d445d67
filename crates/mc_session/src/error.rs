pub type Result<T> = std::result::Result<T, Error>;

/// Shown when the backend no longer accepts the session.
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in to continue.";

/// Shown for any failure that is not the backend's own explanation.
pub const CONNECTION_ERROR: &str =
    "Sorry, there was a problem connecting to the server. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend rejected the session. The user has to log in again.
    #[error("authentication required")]
    AuthRequired,

    /// The backend handled the request and reported a failure.
    #[error("{0}")]
    Application(String),

    /// The backend answered with something that is not a valid response.
    #[error("malformed response: {0}")]
    Malformed(#[source] mc_api::Error),

    /// The reply parsed, but carried neither an answer nor an error.
    #[error("the reply contained no answer")]
    EmptyReply,

    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(#[source] mc_api::Error),

    #[error("credentials are required to log in")]
    MissingCredentials,
}

impl Error {
    /// The text shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::AuthRequired => SESSION_EXPIRED,
            Self::Application(message) => message,
            Self::MissingCredentials => "Please enter a username and password.",
            Self::Malformed(_) | Self::EmptyReply | Self::Transport(_) => CONNECTION_ERROR,
        }
    }
}

impl From<mc_api::Error> for Error {
    fn from(error: mc_api::Error) -> Self {
        use mc_api::Error as E;

        match error {
            E::Unauthorized { .. } => Self::AuthRequired,
            E::Api {
                message: Some(message),
                ..
            } => Self::Application(message),
            error @ E::Json(_) => Self::Malformed(error),
            error => Self::Transport(error),
        }
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
