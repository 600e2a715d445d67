//! A [`View`] that records what it is asked to show.
//!
//! Useful for tests, and for driving a session headlessly.

use mc_api::types::{Capability, User};
use mc_conversation::{Role, Turn};
use parking_lot::Mutex;

use crate::{AnnotationId, Connectivity, View};

/// Which top-level view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Nothing decided yet.
    #[default]
    Loading,
    Login,
    Main,
}

/// A single call made on a [`RecordingView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    ShowLogin(Option<String>),
    ShowMain(Option<String>),
    Redirect(String),
    ShowCapabilities(Vec<String>),
    CapabilitiesError(String),
    ClearCapabilities,
    SetInput(String),
    SubmitEnabled(bool),
    AppendTurn {
        role: Role,
        text: String,
        annotation: Option<AnnotationId>,
    },
    ShowPending,
    RemovePending,
    DimAnnotation(AnnotationId),
    ClearTranscript,
    Connectivity(Connectivity),
}

#[derive(Debug)]
struct State {
    events: Vec<ViewEvent>,
    screen: Screen,
    login_error: Option<String>,
    user: Option<User>,
    redirect: Option<String>,
    capabilities: Vec<Capability>,
    capabilities_error: Option<String>,
    input: String,
    submit_enabled: bool,
    pending: bool,
    turns: Vec<Turn>,

    /// Annotated turns, and whether their annotation has been dimmed.
    annotations: Vec<(AnnotationId, bool)>,
    connectivity: Option<Connectivity>,
}

#[derive(Debug)]
pub struct RecordingView {
    state: Mutex<State>,
}

impl Default for RecordingView {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                events: vec![],
                screen: Screen::Loading,
                login_error: None,
                user: None,
                redirect: None,
                capabilities: vec![],
                capabilities_error: None,
                input: String::new(),
                submit_enabled: true,
                pending: false,
                turns: vec![],
                annotations: vec![],
                connectivity: None,
            }),
        }
    }
}

impl RecordingView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<ViewEvent> {
        self.state.lock().events.clone()
    }

    /// Return and forget the events recorded so far.
    pub fn take_events(&self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.state.lock().events)
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.state.lock().screen
    }

    #[must_use]
    pub fn login_error(&self) -> Option<String> {
        self.state.lock().login_error.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.lock().user.clone()
    }

    #[must_use]
    pub fn redirect(&self) -> Option<String> {
        self.state.lock().redirect.clone()
    }

    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        self.state.lock().capabilities.clone()
    }

    #[must_use]
    pub fn capabilities_error(&self) -> Option<String> {
        self.state.lock().capabilities_error.clone()
    }

    #[must_use]
    pub fn input(&self) -> String {
        self.state.lock().input.clone()
    }

    #[must_use]
    pub fn submit_enabled(&self) -> bool {
        self.state.lock().submit_enabled
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.lock().pending
    }

    #[must_use]
    pub fn turns(&self) -> Vec<Turn> {
        self.state.lock().turns.clone()
    }

    /// Whether the annotation `id` has been dimmed, or `None` if no such
    /// annotation was shown.
    #[must_use]
    pub fn is_dimmed(&self, id: AnnotationId) -> Option<bool> {
        self.state
            .lock()
            .annotations
            .iter()
            .find(|(a, _)| *a == id)
            .map(|(_, dimmed)| *dimmed)
    }

    #[must_use]
    pub fn connectivity(&self) -> Option<Connectivity> {
        self.state.lock().connectivity.clone()
    }
}

impl View for RecordingView {
    fn show_login(&self, error: Option<&str>) {
        let mut state = self.state.lock();
        let error = error.map(str::to_owned);
        state.screen = Screen::Login;
        state.login_error.clone_from(&error);
        state.user = None;
        state.events.push(ViewEvent::ShowLogin(error));
    }

    fn show_main(&self, user: Option<&User>) {
        let mut state = self.state.lock();
        state.screen = Screen::Main;
        state.login_error = None;
        state.user = user.cloned();
        state.events.push(ViewEvent::ShowMain(
            user.and_then(User::display_name).map(str::to_owned),
        ));
    }

    fn redirect(&self, url: &str) {
        let mut state = self.state.lock();
        state.redirect = Some(url.to_owned());
        state.events.push(ViewEvent::Redirect(url.to_owned()));
    }

    fn show_capabilities(&self, capabilities: &[Capability]) {
        let mut state = self.state.lock();
        state.capabilities = capabilities.to_vec();
        state.capabilities_error = None;
        state.events.push(ViewEvent::ShowCapabilities(
            capabilities.iter().map(|c| c.name.clone()).collect(),
        ));
    }

    fn show_capabilities_error(&self, message: &str) {
        let mut state = self.state.lock();
        state.capabilities.clear();
        state.capabilities_error = Some(message.to_owned());
        state
            .events
            .push(ViewEvent::CapabilitiesError(message.to_owned()));
    }

    fn clear_capabilities(&self) {
        let mut state = self.state.lock();
        state.capabilities.clear();
        state.capabilities_error = None;
        state.events.push(ViewEvent::ClearCapabilities);
    }

    fn set_input(&self, text: &str) {
        let mut state = self.state.lock();
        state.input = text.to_owned();
        state.events.push(ViewEvent::SetInput(text.to_owned()));
    }

    fn set_submit_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        state.submit_enabled = enabled;
        state.events.push(ViewEvent::SubmitEnabled(enabled));
    }

    fn append_turn(&self, turn: &Turn, annotation: Option<AnnotationId>) {
        let mut state = self.state.lock();
        state.turns.push(turn.clone());
        if let Some(id) = annotation {
            state.annotations.push((id, false));
        }
        state.events.push(ViewEvent::AppendTurn {
            role: turn.role,
            text: turn.text.clone(),
            annotation,
        });
    }

    fn show_pending(&self) {
        let mut state = self.state.lock();
        state.pending = true;
        state.events.push(ViewEvent::ShowPending);
    }

    fn remove_pending(&self) {
        let mut state = self.state.lock();
        state.pending = false;
        state.events.push(ViewEvent::RemovePending);
    }

    fn dim_annotation(&self, id: AnnotationId) {
        let mut state = self.state.lock();
        for (a, dimmed) in &mut state.annotations {
            if *a == id {
                *dimmed = true;
            }
        }
        state.events.push(ViewEvent::DimAnnotation(id));
    }

    fn clear_transcript(&self) {
        let mut state = self.state.lock();
        state.turns.clear();
        state.annotations.clear();
        state.pending = false;
        state.events.push(ViewEvent::ClearTranscript);
    }

    fn set_connectivity(&self, connectivity: &Connectivity) {
        let mut state = self.state.lock();
        state.connectivity = Some(connectivity.clone());
        state
            .events
            .push(ViewEvent::Connectivity(connectivity.clone()));
    }
}
