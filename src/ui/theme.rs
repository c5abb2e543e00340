//! Dark and light palettes for the control panel

use crate::config::Theme;
use ratatui::style::Color;

/// Colors used by every panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub text: Color,
    /// Borders, separators, unselected values
    pub muted: Color,
    /// Selected tunable and panel titles
    pub accent: Color,
    /// State label while the filter runs
    pub active: Color,
    /// Transient status messages and help headings
    pub notice: Color,
    /// Listener loss and key faults
    pub alert: Color,
    pub bar_bg: Color,
    pub lamp_off: Color,
    pub lamp_on: Color,
    pub lamp_text: Color,
    pub lamp_text_on: Color,
}

impl ThemeColors {
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            text: Color::Rgb(210, 214, 220),
            muted: Color::Rgb(96, 102, 118),
            accent: Color::Rgb(110, 190, 255),
            active: Color::Rgb(120, 220, 140),
            notice: Color::Rgb(250, 200, 90),
            alert: Color::Rgb(255, 110, 110),
            bar_bg: Color::Rgb(44, 48, 58),
            lamp_off: Color::Rgb(36, 38, 46),
            lamp_on: Color::Rgb(120, 220, 140),
            lamp_text: Color::Rgb(150, 154, 166),
            lamp_text_on: Color::Rgb(16, 18, 22),
        }
    }

    /// High contrast for bright terminals
    pub fn light() -> Self {
        Self {
            text: Color::Rgb(28, 30, 36),
            muted: Color::Rgb(130, 134, 146),
            accent: Color::Rgb(0, 100, 190),
            active: Color::Rgb(20, 140, 60),
            notice: Color::Rgb(170, 110, 0),
            alert: Color::Rgb(190, 30, 40),
            bar_bg: Color::Rgb(222, 224, 230),
            lamp_off: Color::Rgb(230, 232, 238),
            lamp_on: Color::Rgb(20, 140, 60),
            lamp_text: Color::Rgb(70, 74, 84),
            lamp_text_on: Color::Rgb(255, 255, 255),
        }
    }
}
