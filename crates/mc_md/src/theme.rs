//! Syntax highlighting themes, from [`two_face`]'s bundled set.

use syntect::highlighting::Theme;
use two_face::theme::{self, EmbeddedThemeName};

const DEFAULT: EmbeddedThemeName = EmbeddedThemeName::MonokaiExtended;

/// Themes selectable by name.
const SELECTABLE: &[EmbeddedThemeName] = &[
    EmbeddedThemeName::Dracula,
    EmbeddedThemeName::Github,
    EmbeddedThemeName::GruvboxDark,
    EmbeddedThemeName::GruvboxLight,
    EmbeddedThemeName::MonokaiExtended,
    EmbeddedThemeName::MonokaiExtendedLight,
    EmbeddedThemeName::Nord,
    EmbeddedThemeName::OneHalfDark,
    EmbeddedThemeName::OneHalfLight,
    EmbeddedThemeName::SolarizedDark,
    EmbeddedThemeName::SolarizedLight,
    EmbeddedThemeName::TwoDark,
    EmbeddedThemeName::Zenburn,
];

/// Resolve a theme by its display name (e.g. `"Dracula"`,
/// `"Solarized (dark)"`), case-insensitively.
///
/// `None` and unknown names resolve to Monokai Extended.
#[must_use]
pub fn resolve(name: Option<&str>) -> Theme {
    let variant = name
        .map(str::trim)
        .and_then(|name| {
            SELECTABLE
                .iter()
                .copied()
                .find(|v| v.as_name().eq_ignore_ascii_case(name))
        })
        .unwrap_or(DEFAULT);

    theme::extra()[variant].clone()
}

#[must_use]
pub fn names() -> impl Iterator<Item = &'static str> {
    SELECTABLE.iter().map(|v| v.as_name())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_resolve() {
        assert_ne!(resolve(Some("dracula")).name, resolve(None).name);
        assert_eq!(resolve(Some(" NORD ")).name, resolve(Some("Nord")).name);
        assert_eq!(resolve(Some("nope")).name, resolve(None).name);
        assert!(names().any(|n| n == "Nord"));
    }
}
