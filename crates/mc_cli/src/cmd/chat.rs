use std::{io, sync::Arc};

use inquire::InquireError;
use mc_api::types::{Credentials, User};
use mc_config::AuthMode;
use mc_session::{ChatSession, LoginOutcome};
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::{debug, trace};

use super::{Output, Success};
use crate::{
    Ctx,
    error::{Error, Result},
    view::TerminalView,
};

const HELP: &str = "\
Commands:
  /capabilities     List what the assistant can do
  /use <n>          Put the example of capability <n> in the draft
  /status           Show session and tool-server status
  /history          Print the transcript as JSON
  /redraw           Clear the screen and print the transcript again
  /login            Log in
  /logout           Log out and clear the transcript
  /help             Show this help
  /quit             Leave the chat

Anything else is sent to the assistant. An empty line sends the draft.
Start a message with // to send it with a single leading /.";

#[derive(Debug, Default, clap::Args)]
pub(crate) struct Chat {
    /// Send this message as soon as the session is ready.
    message: Option<String>,
}

/// A line read at the prompt.
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Empty,
    Message(&'a str),
    Use(usize),
    Capabilities,
    Status,
    History,
    Redraw,
    Login,
    Logout,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_line(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line);
    };

    if command.starts_with('/') {
        return Input::Message(command);
    }

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, arg)| (name, arg.trim()));

    match (name, arg) {
        ("use" | "u", n) => n
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map_or(Input::Unknown(line), Input::Use),
        ("capabilities" | "caps", "") => Input::Capabilities,
        ("status", "") => Input::Status,
        ("history", "") => Input::History,
        ("redraw" | "r", "") => Input::Redraw,
        ("login", "") => Input::Login,
        ("logout", "") => Input::Logout,
        ("help" | "?", "") => Input::Help,
        ("quit" | "exit" | "q", "") => Input::Quit,
        _ => Input::Unknown(line),
    }
}

impl Chat {
    pub(crate) async fn run(self, ctx: &Ctx) -> Output {
        let view = Arc::new(TerminalView::new(
            Box::new(io::stdout()),
            ctx.renderer(),
            ctx.config().capabilities.clone(),
            ctx.use_color(),
        ));
        let session = ctx.session(view.clone(), true);

        if session.start().await
            && let Some(message) = self.message.as_deref()
        {
            session.submit(message).await;
        }

        let repl = Repl { ctx, view, session };
        let result = repl.run().await;
        repl.session.shutdown();

        result.map(|()| Success::Ok).map_err(Into::into)
    }
}

struct Repl<'a> {
    ctx: &'a Ctx,
    view: Arc<TerminalView>,
    session: ChatSession,
}

impl Repl<'_> {
    async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let Some(line) = lines.next_line().await? else {
                debug!("End of input.");
                return Ok(());
            };

            let input = parse_line(&line);
            trace!(?input, "Read input.");

            match input {
                Input::Empty => {
                    let draft = self.view.take_draft();
                    if !draft.is_empty() {
                        self.submit(&draft).await;
                    }
                }
                Input::Message(text) => self.submit(text).await,
                Input::Use(n) => {
                    if self.session.select_capability(n - 1).is_none() {
                        self.view
                            .note(format!("No capability #{n}. Use /capabilities to list them."));
                    }
                }
                Input::Capabilities => {
                    if self.require_login() {
                        let _result = self.session.load_capabilities().await;
                    }
                }
                Input::Status => self.status().await,
                Input::History => {
                    let transcript = serde_json::to_string_pretty(&self.session.transcript())?;
                    self.view.note(transcript);
                }
                Input::Redraw => self.view.redraw(),
                Input::Login => self.login().await?,
                Input::Logout => self.session.logout().await,
                Input::Help => self.view.note(HELP),
                Input::Quit => return Ok(()),
                Input::Unknown(line) => self
                    .view
                    .note(format!("Unknown command: {line}. Use /help for help.")),
            }
        }
    }

    async fn submit(&self, text: &str) {
        if !self.require_login() {
            return;
        }

        if !self.view.submit_enabled() {
            self.view.note("Still waiting for the previous reply.");
            return;
        }

        self.session.submit(text).await;
    }

    fn require_login(&self) -> bool {
        let authenticated = self.session.is_authenticated();
        if !authenticated {
            self.view.note("Not logged in. Use /login to sign in.");
        }

        authenticated
    }

    async fn status(&self) {
        let state = self.session.auth_state();
        match state.user.as_ref().and_then(User::display_name) {
            Some(name) if state.authenticated => self.view.note(format!("Signed in as {name}.")),
            _ if state.authenticated => self.view.note("Signed in."),
            _ => self.view.note("Not logged in."),
        }

        let before = self.view.connectivity();
        let now = self.session.refresh_status().await;
        if before.as_ref() == Some(&now) {
            self.view.note(format!("Tool server: {now}"));
        }
    }

    async fn login(&self) -> Result<()> {
        if self.session.start().await {
            return Ok(());
        }

        let credentials = match self.ctx.config().auth.mode {
            AuthMode::Redirect => None,
            AuthMode::Credentials => {
                match prompt_credentials(self.ctx.config().auth.username.as_deref()) {
                    Ok(credentials) => Some(credentials),
                    Err(Error::Inquire(
                        InquireError::OperationCanceled | InquireError::OperationInterrupted,
                    )) => {
                        self.view.note("Login cancelled.");
                        return Ok(());
                    }
                    Err(error) => return Err(error),
                }
            }
        };

        match self.session.login(credentials).await {
            Ok(LoginOutcome::Redirect(_)) => {
                self.view
                    .note("Once you have signed in with your browser, use /login again.");
            }
            Ok(LoginOutcome::SignedIn) => {}
            Err(error) => debug!(%error, "Login failed."),
        }

        Ok(())
    }
}

/// Ask for a username and password on the terminal.
fn prompt_credentials(username: Option<&str>) -> Result<Credentials> {
    let mut prompt = inquire::Text::new("Username:");
    if let Some(username) = username {
        prompt = prompt.with_default(username);
    }

    let username = prompt.prompt()?;
    let password = inquire::Password::new("Password:")
        .without_confirmation()
        .prompt()?;

    Ok(Credentials::new(username, password))
}
