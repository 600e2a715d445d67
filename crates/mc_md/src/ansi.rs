//! Terminal rendering.

use syntect::{easy::HighlightLines, highlighting::Theme, util::LinesWithEndings};
use unicode_width::UnicodeWidthStr as _;

use crate::{Node, parse, theme};

/// SGR: Bold on.
pub const BOLD_START: &str = "\x1b[1m";

/// SGR: Bold and dim off.
pub const BOLD_END: &str = "\x1b[22m";

/// SGR: Dim on.
pub const DIM_START: &str = "\x1b[2m";

/// SGR: Dim off.
pub const DIM_END: &str = "\x1b[22m";

/// SGR: Full attribute reset.
pub const RESET: &str = "\x1b[0m";

/// Renders chat text for a terminal.
///
/// Text coming from the backend or the user is stripped of control characters
/// before it is written, so it can never inject escape sequences of its own.
#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    wrap_width: usize,
    theme: Theme,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            color: true,
            wrap_width: 0,
            theme: theme::resolve(None),
        }
    }
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether to emit SGR sequences and highlight code.
    #[must_use]
    pub const fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Wrap text at `width` columns. `0` disables wrapping. Code blocks are
    /// never wrapped.
    #[must_use]
    pub const fn wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    #[must_use]
    pub fn theme(mut self, name: Option<&str>) -> Self {
        self.theme = theme::resolve(name);
        self
    }

    /// Render assistant text through the narrow formatter.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        self.nodes(&parse(text))
    }

    /// Render text as-is, apart from wrapping and sanitizing.
    #[must_use]
    pub fn literal(&self, text: &str) -> String {
        let mut out = Output::new(self.wrap_width);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                out.line_break();
            }
            out.text(line);
        }

        out.buf
    }

    #[must_use]
    pub fn nodes(&self, nodes: &[Node]) -> String {
        let mut out = Output::new(self.wrap_width);

        for node in nodes {
            match node {
                Node::Text(text) => out.text(text),
                Node::Strong(text) => {
                    out.raw(self.color, BOLD_START);
                    out.text(text);
                    out.raw(self.color, BOLD_END);
                }
                Node::LineBreak => out.line_break(),
                Node::CodeBlock { language, code } => {
                    let code = sanitize(code, true);
                    let highlighted = language
                        .as_deref()
                        .filter(|_| self.color)
                        .and_then(|language| highlight(&code, language, &self.theme));

                    out.block(highlighted.as_deref().unwrap_or(&code));
                }
            }
        }

        out.buf
    }

    /// Emphasize `text`, if colors are enabled.
    #[must_use]
    pub fn bold(&self, text: &str) -> String {
        self.wrap_sgr(text, BOLD_START, BOLD_END)
    }

    /// De-emphasize `text`, if colors are enabled.
    #[must_use]
    pub fn dim(&self, text: &str) -> String {
        self.wrap_sgr(text, DIM_START, DIM_END)
    }

    fn wrap_sgr(&self, text: &str, start: &str, end: &str) -> String {
        let text = sanitize(text, false);
        if self.color {
            format!("{start}{text}{end}")
        } else {
            text
        }
    }
}

/// Accumulates output while tracking the current column.
struct Output {
    buf: String,
    column: usize,
    wrap_width: usize,

    /// A code block was just written and the next output has to start on a
    /// fresh line.
    after_block: bool,
}

impl Output {
    const fn new(wrap_width: usize) -> Self {
        Self {
            buf: String::new(),
            column: 0,
            wrap_width,
            after_block: false,
        }
    }

    fn raw(&mut self, enabled: bool, sgr: &str) {
        self.finish_block();
        if enabled {
            self.buf.push_str(sgr);
        }
    }

    fn text(&mut self, text: &str) {
        self.finish_block();

        let text = sanitize(text, false);
        if self.wrap_width == 0 {
            self.column += text.width();
            self.buf.push_str(&text);
            return;
        }

        for piece in text.split_inclusive(' ') {
            let word = piece.trim_end_matches(' ').width();
            if self.column > 0 && word > 0 && self.column + word > self.wrap_width {
                self.newline();
                // Spaces at a wrap point are dropped.
                if piece.trim().is_empty() {
                    continue;
                }
            }

            self.column += piece.width();
            self.buf.push_str(piece);
        }
    }

    fn line_break(&mut self) {
        self.finish_block();
        self.newline();
    }

    fn block(&mut self, code: &str) {
        if self.column > 0 || self.after_block {
            self.newline();
        }

        self.buf.push_str(code);
        self.after_block = true;
    }

    fn finish_block(&mut self) {
        if self.after_block {
            self.after_block = false;
            self.newline();
        }
    }

    fn newline(&mut self) {
        self.buf.push('\n');
        self.column = 0;
    }
}

/// Drop control characters, keeping tabs (and newlines if `newlines`).
fn sanitize(text: &str, newlines: bool) -> String {
    text.chars()
        .filter(|&c| !c.is_control() || c == '\t' || (newlines && c == '\n'))
        .collect()
}

/// Syntax-highlight `code` with 24-bit colors.
///
/// Returns `None` if the language is not recognized.
fn highlight(code: &str, language: &str, theme: &Theme) -> Option<String> {
    let syntaxes = two_face::syntax::extra_newlines();
    let syntax = syntaxes.find_syntax_by_token(language)?;

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut buf = String::new();

    for line in LinesWithEndings::from(code) {
        let ranges = highlighter.highlight_line(line, &syntaxes).ok()?;
        buf.push_str(&syntect::util::as_24_bit_terminal_escaped(&ranges, false));
    }

    buf.push_str(RESET);
    Some(buf)
}

#[cfg(test)]
#[path = "ansi_tests.rs"]
mod tests;
