//! Named color palettes for the dashboard. Each maps the semantic roles the
//! Renderer Contract specifies (`normal, highlight, warning, error, dim,
//! header, footer, nmap`) onto a `cursive::theme::Theme`.

use cursive::theme::{BaseColor, BorderStyle, Color, Palette, PaletteColor, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Phosphor,
    Amber,
    Blue,
}

impl ThemeName {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Phosphor => "phosphor",
            ThemeName::Amber => "amber",
            ThemeName::Blue => "blue",
        }
    }

    pub fn from_str(s: &str) -> ThemeName {
        match s {
            "amber" => ThemeName::Amber,
            "blue" => ThemeName::Blue,
            _ => ThemeName::Phosphor,
        }
    }

    /// `t` cycles: phosphor -> amber -> blue -> phosphor.
    pub fn next(self) -> ThemeName {
        match self {
            ThemeName::Phosphor => ThemeName::Amber,
            ThemeName::Amber => ThemeName::Blue,
            ThemeName::Blue => ThemeName::Phosphor,
        }
    }

    pub fn cursive_theme(self) -> Theme {
        let accent = match self {
            ThemeName::Phosphor => BaseColor::Green.dark(),
            ThemeName::Amber => BaseColor::Yellow.dark(),
            ThemeName::Blue => BaseColor::Cyan.dark(),
        };

        let mut palette = Palette::default();
        palette[PaletteColor::Background] = Color::TerminalDefault;
        palette[PaletteColor::View] = Color::TerminalDefault;
        palette[PaletteColor::Primary] = accent;
        palette[PaletteColor::TitlePrimary] = accent;
        palette[PaletteColor::Highlight] = accent;
        palette[PaletteColor::HighlightText] = Color::TerminalDefault;

        Theme {
            shadow: false,
            borders: BorderStyle::Simple,
            palette,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_theme_cycle() {
        let mut theme = ThemeName::from_str("phosphor");
        theme = theme.next();
        assert_eq!(theme, ThemeName::Amber);
        theme = theme.next();
        assert_eq!(theme, ThemeName::Blue);
        theme = theme.next();
        assert_eq!(theme, ThemeName::Phosphor);
    }

    #[test]
    fn test_unknown_config_value_defaults_to_phosphor() {
        assert_eq!(ThemeName::from_str("nonsense"), ThemeName::Phosphor);
    }
}
