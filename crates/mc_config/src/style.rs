//! Terminal output style.

use schematic::Config;
use serde::Serialize;

use crate::{
    Result,
    assignment::{AssignKeyValue, KvAssignment, missing_key},
};

#[derive(Debug, Clone, PartialEq, Serialize, Config)]
#[config(rename_all = "snake_case")]
pub struct StyleConfig {
    /// Whether to emit ANSI colors and emphasis.
    #[setting(default = true)]
    pub color: bool,

    /// Wrap transcript text at this many columns. `0` disables wrapping.
    pub wrap_width: usize,

    /// Syntax highlighting theme for fenced code blocks, e.g. `Dracula` or
    /// `Nord`. Unknown names fall back to the default theme.
    pub theme: Option<String>,
}

impl AssignKeyValue for StyleConfig {
    fn assign(&mut self, kv: KvAssignment) -> Result<()> {
        match kv.key_string().as_str() {
            "color" => self.color = kv.try_bool()?,
            "wrap_width" => self.wrap_width = kv.try_from_str()?,
            "theme" => self.theme = kv.try_some_string()?,
            _ => return missing_key(&kv),
        }

        Ok(())
    }
}
