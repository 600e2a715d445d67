//! HTML fragments for embedding the chat in a web view.
//!
//! All text is escaped by [`maud`]. The only markup ever produced is the one
//! emitted here.

use maud::{Markup, html};
use mc_conversation::{Role, Turn};

use crate::{Node, parse};

/// Render assistant text through the narrow formatter.
#[must_use]
pub fn render(text: &str) -> Markup {
    nodes(&parse(text))
}

#[must_use]
pub fn nodes(nodes: &[Node]) -> Markup {
    html! {
        @for node in nodes {
            @match node {
                Node::Text(text) => (text),
                Node::Strong(text) => strong { (text) },
                Node::LineBreak => br;
                Node::CodeBlock { language, code } => {
                    pre {
                        code class=[language.as_ref().map(|l| format!("language-{l}"))] {
                            (code)
                        }
                    }
                }
            }
        }
    }
}

/// Render text literally, never interpreting it as markup.
#[must_use]
pub fn literal(text: &str) -> Markup {
    html! { (text) }
}

/// Render a transcript turn.
///
/// `emphasized` controls the tool-call annotation, which is shown in full
/// right after a reply arrives and dimmed afterwards.
#[must_use]
pub fn turn(turn: &Turn, emphasized: bool) -> Markup {
    html! {
        div class={ "message " (turn.role.as_str()) } {
            div.content {
                @match turn.role {
                    Role::Assistant => (render(&turn.text)),
                    Role::User | Role::System => (literal(&turn.text)),
                }
            }

            @if !turn.tool_calls.is_empty() {
                div.tool-calls.dimmed[!emphasized] {
                    "Used tools: "
                    @for (i, call) in turn.tool_calls.iter().enumerate() {
                        @if i > 0 { ", " }
                        span.tool-call title=(call.summary()) { (call.name) }
                    }
                }
            }
        }
    }
}

/// The transient indicator shown while a reply is outstanding.
#[must_use]
pub fn pending() -> Markup {
    html! {
        div.message.assistant.pending {
            span.dot {} span.dot {} span.dot {}
        }
    }
}

#[cfg(test)]
mod tests {
    use mc_conversation::ToolCall;
    use serde_json::json;
    use test_log::test;

    use super::*;

    #[test]
    fn test_render_formats_assistant_text() {
        assert_eq!(
            render("**bold** line1\nline2").into_string(),
            "<strong>bold</strong> line1<br>line2"
        );
    }

    #[test]
    fn test_render_escapes_markup() {
        assert_eq!(
            render("**<b>x</b>** <script>").into_string(),
            "<strong>&lt;b&gt;x&lt;/b&gt;</strong> &lt;script&gt;"
        );
    }

    #[test]
    fn test_code_block() {
        insta::assert_snapshot!(
            render("Try:\n```rust\nif a < b {}\n```\nok").into_string(),
            @r#"Try:<pre><code class="language-rust">if a &lt; b {}</code></pre>ok"#
        );

        assert_eq!(
            render("```\nplain\n```").into_string(),
            "<pre><code>plain</code></pre>"
        );
    }

    #[test]
    fn test_literal_escapes_everything() {
        assert_eq!(
            literal("<script>alert('**x**')</script>").into_string(),
            "&lt;script&gt;alert('**x**')&lt;/script&gt;"
        );
    }

    #[test]
    fn test_user_turn_is_literal() {
        let turn = Turn::user("**not bold** <i>");

        insta::assert_snapshot!(
            super::turn(&turn, true).into_string(),
            @r#"<div class="message user"><div class="content">**not bold** &lt;i&gt;</div></div>"#
        );
    }

    #[test]
    fn test_assistant_turn_with_tool_calls() {
        let turn = Turn::assistant("It is **4**.", vec![ToolCall::new(
            "calculate",
            json!({ "expression": "2+2" }),
        )]);

        insta::assert_snapshot!(
            super::turn(&turn, true).into_string(),
            @r#"<div class="message assistant"><div class="content">It is <strong>4</strong>.</div><div class="tool-calls">Used tools: <span class="tool-call" title="calculate(expression: &quot;2+2&quot;)">calculate</span></div></div>"#
        );

        let dimmed = super::turn(&turn, false).into_string();
        assert!(dimmed.contains(r#"<div class="tool-calls dimmed">"#));
    }
}
