use std::{io, sync::Arc};

use mc_conversation::ToolCall;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_log::test;

use super::*;

/// A writer whose output can be read back after it is handed to the view.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn take(&self) -> String {
        String::from_utf8(std::mem::take(&mut *self.0.lock())).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn icons() -> CapabilitiesConfig {
    CapabilitiesConfig {
        default_icon: "🔧".to_owned(),
        icons: [].into_iter().collect(),
    }
}

fn plain_view() -> (SharedBuf, TerminalView) {
    let buf = SharedBuf::default();
    let view = TerminalView::new(
        Box::new(buf.clone()),
        Renderer::new().color(false),
        icons(),
        false,
    );

    (buf, view)
}

fn calculate() -> ToolCall {
    ToolCall::new("calculate", json!({ "expression": "2+2" }))
}

#[test]
fn test_conversation() {
    let (buf, view) = plain_view();

    view.append_turn(&Turn::user("What is **2+2**?"), None);
    view.show_pending();
    view.remove_pending();
    view.append_turn(
        &Turn::assistant("It is **4**.\nDone.", vec![calculate()]),
        Some(AnnotationId(1)),
    );
    view.append_turn(&Turn::system("Sorry, try again."), None);

    insta::assert_snapshot!(buf.take(), @r#"
    user › What is **2+2**?
    assistant › It is 4.
    Done.
    🧮 Used tools: calculate(expression: "2+2")
    system › Sorry, try again.
    "#);
}

#[test]
fn test_annotation_emphasis() {
    let buf = SharedBuf::default();
    let view = TerminalView::new(Box::new(buf.clone()), Renderer::new(), icons(), true);
    let turn = Turn::assistant("4", vec![calculate()]);

    view.append_turn(&turn, Some(AnnotationId(1)));
    let out = buf.take();
    assert!(out.contains(mc_md::ansi::BOLD_START), "{out:?}");

    assert_eq!(
        view.annotation(&turn, false),
        format!(
            "{}🧮 Used tools: calculate(expression: \"2+2\"){}",
            mc_md::ansi::DIM_START,
            mc_md::ansi::DIM_END
        )
    );

    view.dim_annotation(AnnotationId(1));
    assert_eq!(view.state.lock().annotations, vec![(AnnotationId(1), true)]);
}

#[test]
fn test_draft() {
    let (buf, view) = plain_view();

    view.set_input("What is 15% of 240?");
    assert_eq!(
        buf.take(),
        "Draft: What is 15% of 240? (press Enter to send)\n"
    );

    view.set_input("");
    assert_eq!(buf.take(), "");
    assert_eq!(view.take_draft(), "");

    view.set_input("again");
    assert_eq!(view.take_draft(), "again");
    assert_eq!(view.take_draft(), "");
}

#[test]
fn test_pending_is_silent_without_tty() {
    let (buf, view) = plain_view();

    view.show_pending();
    view.remove_pending();

    assert_eq!(buf.take(), "");
}

#[test]
fn test_pending_is_cleared_on_tty() {
    let buf = SharedBuf::default();
    let view = TerminalView::new(Box::new(buf.clone()), Renderer::new(), icons(), true);

    view.show_pending();
    assert!(buf.take().contains("thinking"));

    view.remove_pending();
    let out = buf.take();
    assert!(out.starts_with('\r') || out.contains("\u{1b}["), "{out:?}");

    view.remove_pending();
    assert_eq!(buf.take(), "");
}

#[test]
fn test_login_and_redirect() {
    let (buf, view) = plain_view();

    view.show_login(Some("Your session has expired. Please log in to continue."));
    view.redirect("https://idp.example.com/authorize?state=\u{1b}x");

    insta::assert_snapshot!(buf.take(), @r"
    Your session has expired. Please log in to continue.
    Not logged in. Use /login to sign in.
    Open this URL in your browser to log in:
      https://idp.example.com/authorize?state=x
    ");
}

#[test]
fn test_connectivity_is_only_shown_on_change() {
    let (buf, view) = plain_view();

    view.set_connectivity(&Connectivity::Connected { server_url: None });
    view.set_connectivity(&Connectivity::Connected { server_url: None });
    view.set_connectivity(&Connectivity::Unreachable);

    assert_eq!(
        buf.take(),
        "Tool server: connected\nTool server: unreachable\n"
    );
}

#[test]
fn test_capabilities() {
    let (buf, view) = plain_view();

    view.show_capabilities(&[Capability {
        name: "integrate".to_owned(),
        description: "Integrals".to_owned(),
        example: "Integrate x^2".to_owned(),
    }]);
    let out = buf.take();
    assert!(out.contains("integrate"), "{out}");
    assert!(out.contains('∫'), "{out}");
    assert!(out.ends_with("Use /use <n> to try one.\n"), "{out}");

    view.show_capabilities(&[]);
    assert_eq!(buf.take(), "The backend offers no capabilities.\n");

    view.show_capabilities_error("MCP server unavailable");
    assert_eq!(
        buf.take(),
        "Capabilities unavailable: MCP server unavailable\n"
    );
}

#[test]
fn test_redraw_renders_dimmed_annotations() {
    let buf = SharedBuf::default();
    let view = TerminalView::new(Box::new(buf.clone()), Renderer::new(), icons(), true);
    let first = Turn::assistant("4", vec![calculate()]);
    let second = Turn::assistant("6", vec![calculate()]);

    view.append_turn(&Turn::user("2+2?"), None);
    view.append_turn(&first, Some(AnnotationId(1)));
    view.append_turn(&Turn::user("3+3?"), None);
    view.append_turn(&second, Some(AnnotationId(3)));
    view.dim_annotation(AnnotationId(1));
    buf.take();

    view.redraw();

    let out = buf.take();
    let dimmed = view.annotation(&first, false);
    let emphasized = view.annotation(&second, true);
    assert_eq!(out.matches(&dimmed).count(), 1, "{out:?}");
    assert_eq!(out.matches(&emphasized).count(), 1, "{out:?}");
    assert!(out.find(&dimmed) < out.find(&emphasized), "{out:?}");
}

#[test]
fn test_redraw_after_clear() {
    let (buf, view) = plain_view();

    view.append_turn(&Turn::user("2+2?"), None);
    view.clear_transcript();
    buf.take();

    view.redraw();

    assert_eq!(buf.take(), "The transcript is empty.\n");
}

#[test]
fn test_clear_capabilities_is_silent() {
    let (buf, view) = plain_view();

    view.clear_capabilities();

    assert_eq!(buf.take(), "");
}
