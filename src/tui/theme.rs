//! Theme and Styling
//!
//! Light and dark palettes for the TUI. `system` follows the terminal
//! background when it can be detected and falls back to dark.

use ratatui::style::{Color, Modifier, Style};

use crate::settings::{self, Theme};

/// Resolved colors for one theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_dim: Color,
    pub bg: Color,
    pub border: Color,
    pub border_focused: Color,
    pub user: Color,
    pub assistant: Color,
}

impl Palette {
    pub const DARK: Palette = Palette {
        accent: Color::Rgb(0, 212, 255),
        success: Color::Rgb(34, 197, 94),
        warning: Color::Rgb(251, 191, 36),
        error: Color::Rgb(239, 68, 68),
        text_primary: Color::Rgb(229, 229, 229),
        text_secondary: Color::Rgb(161, 161, 161),
        text_dim: Color::Rgb(82, 82, 82),
        bg: Color::Rgb(10, 10, 10),
        border: Color::Rgb(51, 51, 51),
        border_focused: Color::Rgb(59, 130, 246),
        user: Color::Rgb(34, 197, 94),
        assistant: Color::Rgb(0, 212, 255),
    };

    pub const LIGHT: Palette = Palette {
        accent: Color::Rgb(37, 99, 235),
        success: Color::Rgb(22, 163, 74),
        warning: Color::Rgb(180, 83, 9),
        error: Color::Rgb(220, 38, 38),
        text_primary: Color::Rgb(23, 23, 23),
        text_secondary: Color::Rgb(82, 82, 82),
        text_dim: Color::Rgb(163, 163, 163),
        bg: Color::Rgb(250, 250, 250),
        border: Color::Rgb(212, 212, 212),
        border_focused: Color::Rgb(37, 99, 235),
        user: Color::Rgb(22, 163, 74),
        assistant: Color::Rgb(37, 99, 235),
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::LIGHT,
            Theme::Dark => Self::DARK,
            Theme::System => match settings::preference_from_env() {
                Some(Theme::Light) => Self::LIGHT,
                _ => Self::DARK,
            },
        }
    }

    // === Styles ===

    pub fn base(&self) -> Style {
        Style::default().fg(self.text_primary).bg(self.bg)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.text_primary)
    }

    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    pub fn text_dim(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn heading(&self) -> Style {
        Style::default()
            .fg(self.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn user_message(&self) -> Style {
        Style::default().fg(self.user).add_modifier(Modifier::BOLD)
    }

    pub fn assistant_message(&self) -> Style {
        Style::default()
            .fg(self.assistant)
            .add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_key(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_desc(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    /// Active/in-progress indicator
    pub fn active(&self) -> Style {
        Style::default()
            .fg(self.warning)
            .add_modifier(Modifier::BOLD)
    }

    pub fn badge(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}

/// Status icons
pub struct Icons;

impl Icons {
    pub const ACTIVE: &'static str = "●";
    pub const IDLE: &'static str = "○";
    pub const CURSOR: &'static str = "▌";
    pub const DOT: &'static str = "•";
    /// Cycled in the header while animation is on
    pub const HEADER: [&'static str; 4] = ["📄", "📊", "🧠", "🔍"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_themes() {
        assert_eq!(Palette::for_theme(Theme::Light), Palette::LIGHT);
        assert_eq!(Palette::for_theme(Theme::Dark), Palette::DARK);
    }
}
