//! The terminal front-end of a session.

use std::{fmt::Display, io::Write};

use crossterm::{
    cursor::{MoveTo, MoveToColumn},
    queue,
    style::Stylize as _,
    terminal::{Clear, ClearType},
};
use mc_api::types::{Capability, User};
use mc_config::capabilities::CapabilitiesConfig;
use mc_conversation::{Role, Turn};
use mc_md::ansi::Renderer;
use mc_session::{AnnotationId, Connectivity, View};
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::table;

#[derive(Debug, Default)]
struct State {
    /// Pre-filled text for the next message.
    draft: String,
    pending: bool,
    submit_enabled: bool,

    /// Turns shown so far, kept for [`TerminalView::redraw`].
    turns: Vec<(Turn, Option<AnnotationId>)>,
    annotations: Vec<(AnnotationId, bool)>,
    connectivity: Option<Connectivity>,
}

/// Writes session output to a terminal.
///
/// Output is append-only: a tool annotation that is dimmed after it scrolled
/// by shows up dimmed on the next [`TerminalView::redraw`].
pub(crate) struct TerminalView {
    out: Mutex<Box<dyn Write + Send>>,
    renderer: Renderer,
    icons: CapabilitiesConfig,

    /// Whether colors and cursor movement are available.
    tty: bool,

    state: Mutex<State>,
}

impl TerminalView {
    pub(crate) fn new(
        out: Box<dyn Write + Send>,
        renderer: Renderer,
        icons: CapabilitiesConfig,
        tty: bool,
    ) -> Self {
        Self {
            out: Mutex::new(out),
            renderer,
            icons,
            tty,
            state: Mutex::new(State {
                submit_enabled: true,
                ..State::default()
            }),
        }
    }

    /// Take the pre-filled draft, leaving it empty.
    pub(crate) fn take_draft(&self) -> String {
        std::mem::take(&mut self.state.lock().draft)
    }

    pub(crate) fn submit_enabled(&self) -> bool {
        self.state.lock().submit_enabled
    }

    /// The tool-server state last shown.
    pub(crate) fn connectivity(&self) -> Option<Connectivity> {
        self.state.lock().connectivity.clone()
    }

    /// Clear the screen and print the transcript again, each tool annotation
    /// emphasized or dimmed as it currently is.
    pub(crate) fn redraw(&self) {
        let turns = {
            let state = self.state.lock();
            state
                .turns
                .iter()
                .map(|(turn, id)| {
                    let emphasized = id.is_some_and(|id| state.annotations.contains(&(id, false)));
                    (turn.clone(), emphasized)
                })
                .collect::<Vec<_>>()
        };

        if self.tty {
            let mut out = self.out.lock();
            if let Err(error) =
                queue!(out, Clear(ClearType::All), MoveTo(0, 0)).and_then(|()| out.flush())
            {
                warn!(%error, "Failed to write to terminal.");
            }
        }

        if turns.is_empty() {
            self.note("The transcript is empty.");
        }

        for (turn, emphasized) in &turns {
            self.write_turn(turn, *emphasized);
        }
    }

    /// Write a line of informational text.
    pub(crate) fn note(&self, text: impl Display) {
        let text = text.to_string();
        let line = if self.tty {
            text.dim().to_string()
        } else {
            text
        };

        self.line(&line);
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock();
        if let Err(error) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            warn!(%error, "Failed to write to terminal.");
        }
    }

    fn label(&self, role: Role) -> String {
        let label = format!("{role} ›");
        if !self.tty {
            return label;
        }

        match role {
            Role::User => label.bold().cyan().to_string(),
            Role::Assistant => label.bold().green().to_string(),
            Role::System => label.bold().red().to_string(),
        }
    }

    fn write_turn(&self, turn: &Turn, emphasized: bool) {
        let text = match turn.role {
            Role::Assistant => self.renderer.render(&turn.text),
            Role::User | Role::System => self.renderer.literal(&turn.text),
        };

        self.line(&format!("{} {text}", self.label(turn.role)));

        if !turn.tool_calls.is_empty() {
            self.line(&self.annotation(turn, emphasized));
        }
    }

    fn annotation(&self, turn: &Turn, emphasized: bool) -> String {
        let text = tools_used(turn, &self.icons);
        match (self.tty, emphasized) {
            (false, _) => self.renderer.literal(&text),
            (true, true) => self.renderer.bold(&text).yellow().to_string(),
            (true, false) => self.renderer.dim(&text),
        }
    }
}

/// One line naming the tools behind an assistant turn.
pub(crate) fn tools_used(turn: &Turn, icons: &CapabilitiesConfig) -> String {
    let icons: String = turn
        .tool_calls
        .iter()
        .map(|call| icons.icon_for(&call.name))
        .collect();
    let calls: Vec<String> = turn.tool_calls.iter().map(|call| call.summary()).collect();

    format!("{icons} Used tools: {}", calls.join(", "))
}

impl View for TerminalView {
    fn show_login(&self, error: Option<&str>) {
        if let Some(error) = error {
            let error = self.renderer.literal(error);
            self.line(&if self.tty { error.red().to_string() } else { error });
        }

        self.note("Not logged in. Use /login to sign in.");
    }

    fn show_main(&self, user: Option<&User>) {
        match user.and_then(User::display_name) {
            Some(name) => self.note(format!("Signed in as {}.", self.renderer.literal(name))),
            None => self.note("Signed in."),
        }
    }

    fn redirect(&self, url: &str) {
        self.line("Open this URL in your browser to log in:");
        self.line(&format!("  {}", self.renderer.literal(url)));
    }

    fn show_capabilities(&self, capabilities: &[Capability]) {
        if capabilities.is_empty() {
            self.note("The backend offers no capabilities.");
            return;
        }

        let (header, rows) = table::capabilities(capabilities, &self.icons);
        self.line(&table::list(header, rows));
        self.note("Use /use <n> to try one.");
    }

    fn show_capabilities_error(&self, message: &str) {
        self.note(format!(
            "Capabilities unavailable: {}",
            self.renderer.literal(message)
        ));
    }

    fn clear_capabilities(&self) {
        trace!("Capability catalogue dropped.");
    }

    fn set_input(&self, text: &str) {
        text.clone_into(&mut self.state.lock().draft);

        if !text.is_empty() {
            self.note(format!(
                "Draft: {} (press Enter to send)",
                self.renderer.literal(text)
            ));
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.state.lock().submit_enabled = enabled;
    }

    fn append_turn(&self, turn: &Turn, annotation: Option<AnnotationId>) {
        let mut state = self.state.lock();
        state.turns.push((turn.clone(), annotation));
        if let Some(id) = annotation {
            state.annotations.push((id, false));
        }
        drop(state);

        self.write_turn(turn, annotation.is_some());
    }

    fn show_pending(&self) {
        self.state.lock().pending = true;
        if !self.tty {
            return;
        }

        let mut out = self.out.lock();
        if let Err(error) = write!(out, "{}", "… thinking".dim()).and_then(|()| out.flush()) {
            warn!(%error, "Failed to write to terminal.");
        }
    }

    fn remove_pending(&self) {
        let was_pending = std::mem::take(&mut self.state.lock().pending);
        if !self.tty || !was_pending {
            return;
        }

        let mut out = self.out.lock();
        if let Err(error) = queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))
            .and_then(|()| out.flush())
        {
            warn!(%error, "Failed to write to terminal.");
        }
    }

    fn dim_annotation(&self, id: AnnotationId) {
        trace!(?id, "Tool annotation expired.");

        for (annotation, dimmed) in &mut self.state.lock().annotations {
            if *annotation == id {
                *dimmed = true;
            }
        }
    }

    fn clear_transcript(&self) {
        let mut state = self.state.lock();
        state.turns.clear();
        state.annotations.clear();
        state.draft.clear();
        drop(state);

        self.note("Transcript cleared.");
    }

    fn set_connectivity(&self, connectivity: &Connectivity) {
        let mut state = self.state.lock();
        if state.connectivity.as_ref() == Some(connectivity) {
            return;
        }

        state.connectivity = Some(connectivity.clone());
        drop(state);

        self.note(format!("Tool server: {connectivity}"));
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
