//! Custom TUI widgets

use super::{ThemeColors, TunableRow};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Table of tunables with the selected row highlighted
pub struct TunablesPanel<'a> {
    rows: &'a [TunableRow],
    colors: ThemeColors,
}

impl<'a> TunablesPanel<'a> {
    pub fn new(rows: &'a [TunableRow], colors: ThemeColors) -> Self {
        Self { rows, colors }
    }
}

impl<'a> Widget for TunablesPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Tunables ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.muted));

        let inner = block.inner(area);
        block.render(area, buf);

        let label_width = self.rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);

        for (i, row) in self.rows.iter().enumerate() {
            let y = inner.y + i as u16;
            if y >= inner.y + inner.height {
                break;
            }

            let (marker, label_style, value_style) = if row.selected {
                (
                    "▶ ",
                    Style::default()
                        .fg(self.colors.accent)
                        .add_modifier(Modifier::BOLD),
                    Style::default()
                        .fg(self.colors.accent)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (
                    "  ",
                    Style::default().fg(self.colors.text),
                    Style::default().fg(self.colors.muted),
                )
            };

            let line = Line::from(vec![
                Span::styled(marker, label_style),
                Span::styled(
                    format!("{:<w$}  ", row.label, w = label_width),
                    label_style,
                ),
                Span::styled(row.value.as_str(), value_style),
            ]);
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}

/// Widget for the help screen
pub struct HelpPanel {
    colors: ThemeColors,
}

impl HelpPanel {
    pub fn new(colors: ThemeColors) -> Self {
        Self { colors }
    }
}

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Help - VR Walker")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.accent));

        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = [
            "",
            " CONTROLS",
            " -----------",
            " Space            : Start / stop",
            " Up / Down        : Select tunable",
            " Left / Right     : Adjust selected tunable",
            " Shift+Left/Right : Adjust in steps of ten",
            " s                : Save settings",
            " ? / h            : Toggle this help",
            " q / Esc          : Stop and quit",
            "",
            " HOW IT WORKS",
            " -----------",
            " Moving the mouse up holds the forward key.",
            " Fast upward motion adds the sprint key.",
            " Keys are released once the mouse stops.",
        ];

        for (i, line) in help_text.iter().enumerate() {
            if i as u16 >= inner.height {
                break;
            }
            let style = if line.contains("---") {
                Style::default().fg(self.colors.muted)
            } else if line.chars().nth(1).is_some_and(|c| c.is_uppercase())
                && line.to_uppercase() == *line
            {
                Style::default()
                    .fg(self.colors.notice)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.text)
            };
            buf.set_string(inner.x, inner.y + i as u16, line, style);
        }
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    active: bool,
    elapsed: &'a str,
    message: Option<&'a str>,
    alert: Option<&'a str>,
    colors: ThemeColors,
}

impl<'a> StatusBar<'a> {
    pub fn new(active: bool, elapsed: &'a str, colors: ThemeColors) -> Self {
        Self {
            active,
            elapsed,
            message: None,
            alert: None,
            colors,
        }
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }

    /// Persistent problem, shown instead of the transient message
    pub fn alert(mut self, alert: Option<&'a str>) -> Self {
        self.alert = alert;
        self
    }
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg_style = Style::default().bg(self.colors.bar_bg).fg(self.colors.text);
        for x in area.x..area.x + area.width {
            buf.set_string(x, area.y, " ", bg_style);
        }

        let (state, state_color) = if self.active {
            ("ACTIVE", self.colors.active)
        } else {
            ("STOPPED", self.colors.muted)
        };
        let left = format!(" {} ", state);
        let state_style = bg_style.fg(state_color).add_modifier(Modifier::BOLD);
        buf.set_string(area.x, area.y, &left, state_style);

        let center = match (self.alert, self.message) {
            (Some(alert), _) => Some((alert, self.colors.alert)),
            (None, Some(msg)) => Some((msg, self.colors.notice)),
            (None, None) => None,
        };
        if let Some((text, color)) = center {
            let style = bg_style.fg(color);
            let x = area.x + (area.width / 2).saturating_sub(text.len() as u16 / 2);
            buf.set_string(x, area.y, text, style);
        }

        let right = format!(" {} ", self.elapsed);
        let right_x = area.x + area.width.saturating_sub(right.len() as u16);
        buf.set_string(right_x, area.y, &right, bg_style);
    }
}
