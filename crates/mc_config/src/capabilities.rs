//! Presentation of the capability catalogue.

use indexmap::IndexMap;
use schematic::Config;
use serde::Serialize;

use crate::{
    Result,
    assignment::{AssignKeyValue, KvAssignment, missing_key},
};

/// Icons for the capabilities the reference backend ships with.
const BUILTIN_ICONS: &[(&str, &str)] = &[
    ("calculate", "🧮"),
    ("solve equation", "⚖️"),
    ("differentiate", "📈"),
    ("integrate", "∫"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Config)]
#[config(rename_all = "snake_case")]
pub struct CapabilitiesConfig {
    /// Icon for capabilities without a specific one.
    #[setting(default = "🔧")]
    pub default_icon: String,

    /// Capability name to icon. Names match case-insensitively.
    pub icons: IndexMap<String, String>,
}

impl CapabilitiesConfig {
    /// The icon to show next to the capability called `name`.
    #[must_use]
    pub fn icon_for(&self, name: &str) -> &str {
        let name = name.trim();

        self.icons
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, icon)| icon.as_str())
            .or_else(|| {
                BUILTIN_ICONS
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, icon)| *icon)
            })
            .unwrap_or(self.default_icon.as_str())
    }
}

impl AssignKeyValue for CapabilitiesConfig {
    fn assign(&mut self, mut kv: KvAssignment) -> Result<()> {
        match kv.key_string().as_str() {
            "default_icon" => self.default_icon = kv.try_string()?,
            "icons" => self.icons = kv.try_object()?,
            _ if kv.p("icons") => {
                let name = kv.key_string();
                self.icons.insert(name, kv.try_string()?);
            }
            _ => return missing_key(&kv),
        }

        Ok(())
    }
}
