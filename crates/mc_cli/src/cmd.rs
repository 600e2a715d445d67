mod ask;
mod capabilities;
mod chat;
mod config;
mod status;

use std::fmt;

use comfy_table::Row;
use serde_json::Value;

use crate::Ctx;

/// Exit code for commands that need a session the user does not have.
const EXIT_NOT_AUTHENTICATED: i32 = 2;

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Commands {
    /// Chat interactively (the default).
    Chat(chat::Chat),

    /// Send a single message and print the reply.
    #[command(visible_alias = "a")]
    Ask(ask::Ask),

    /// List the capabilities of the backend.
    #[command(visible_alias = "caps")]
    Capabilities(capabilities::Capabilities),

    /// Show session and tool-server status.
    Status(status::Status),

    /// Configuration management.
    #[command(visible_alias = "cfg")]
    Config(config::Config),
}

impl Default for Commands {
    fn default() -> Self {
        Self::Chat(chat::Chat::default())
    }
}

impl Commands {
    pub(crate) async fn run(self, ctx: &Ctx) -> Output {
        match self {
            Self::Chat(args) => args.run(ctx).await,
            Self::Ask(args) => args.run(ctx).await,
            Self::Capabilities(args) => args.run(ctx).await,
            Self::Status(args) => args.run(ctx).await,
            Self::Config(args) => args.run(ctx),
        }
    }

    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::Ask(_) => "ask",
            Self::Capabilities(_) => "capabilities",
            Self::Status(_) => "status",
            Self::Config(_) => "config",
        }
    }
}

pub(crate) type Output = std::result::Result<Success, Error>;

/// The type of output that should be printed to the screen.
#[derive(Debug)]
pub(crate) enum Success {
    /// The command was successful.
    Ok,

    /// Single message to be printed to the screen.
    Message(String),

    /// List of details to be printed in a table.
    Table { header: Row, rows: Vec<Row> },

    /// Details of a single item to be printed.
    Details {
        title: Option<String>,
        rows: Vec<Row>,
    },

    /// JSON value to be printed.
    Json(Value),
}

impl From<()> for Success {
    fn from((): ()) -> Self {
        Self::Ok
    }
}

impl From<String> for Success {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<Value> for Success {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) struct Error {
    /// The error code.
    ///
    /// Used to exit the CLI with a specific exit code. This is usually `1`,
    /// and never `0`.
    pub(crate) code: i32,

    /// The optional error message to be displayed to the user.
    pub(crate) message: Option<String>,

    /// Metadata to be displayed to the user.
    pub(crate) metadata: Vec<(String, Value)>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message.as_deref().unwrap_or_default())
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        (1, error).into()
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        error.to_owned().into()
    }
}

impl From<(i32, String)> for Error {
    fn from((code, message): (i32, String)) -> Self {
        (code, message, vec![]).into()
    }
}

impl From<(i32, String, Vec<(String, Value)>)> for Error {
    fn from((code, message, metadata): (i32, String, Vec<(String, Value)>)) -> Self {
        Self {
            code: if code == 0 { 1 } else { code },
            message: Some(message),
            metadata,
        }
    }
}

impl From<Vec<(&'static str, String)>> for Error {
    fn from(metadata: Vec<(&'static str, String)>) -> Self {
        let mut message = "Application error".to_owned();
        let mut rest = vec![];
        for (key, value) in metadata {
            if key == "message" {
                message = value;
            } else {
                rest.push((key.to_owned(), Value::String(value)));
            }
        }

        (1, message, rest).into()
    }
}

impl From<crate::error::Error> for Error {
    fn from(error: crate::error::Error) -> Self {
        use crate::error::Error::*;

        match error {
            Command(error) => error,
            Config(error) => with_cause(&error, "Configuration error").into(),
            Api(error) => with_cause(&error, "Backend error").into(),
            Session(error) => error.into(),
            NotAuthenticated => (
                EXIT_NOT_AUTHENTICATED,
                "Not logged in. Run `mcpchat chat` and use /login, or set a token.".to_owned(),
            )
                .into(),
            Io(error) => with_cause(&error, "IO error").into(),
            Json(error) => with_cause(&error, "Error while handling JSON").into(),
            Inquire(error) => with_cause(&error, "Prompt error").into(),
        }
    }
}

impl From<mc_session::Error> for Error {
    fn from(error: mc_session::Error) -> Self {
        use mc_session::Error::*;

        match &error {
            AuthRequired => (EXIT_NOT_AUTHENTICATED, error.user_message().to_owned()).into(),
            Application(message) => message.clone().into(),
            Malformed(source) | Transport(source) => [
                ("message", error.user_message().to_owned()),
                ("error", source.to_string()),
            ]
            .to_vec()
            .into(),
            EmptyReply | MissingCredentials => error.user_message().into(),
        }
    }
}

fn with_cause(
    mut error: &dyn std::error::Error,
    message: impl Into<String>,
) -> Vec<(&'static str, String)> {
    let mut causes = vec![("message", message.into()), ("", format!("{error:#}"))];
    while let Some(cause) = error.source() {
        error = cause;
        causes.push(("", format!("{error:#}")));
    }

    causes
}
