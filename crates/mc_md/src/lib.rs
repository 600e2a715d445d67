//! Formatting of chat text.
//!
//! Assistant replies go through a deliberately narrow formatter: fenced code
//! blocks, `**bold**` and line breaks are recognised, everything else stays
//! literal text. The parsed [`Node`]s are rendered either as an HTML fragment
//! ([`html`]) or as terminal output ([`ansi`]).

pub mod ansi;
mod format;
pub mod html;
pub mod theme;

pub use format::{Node, parse};
