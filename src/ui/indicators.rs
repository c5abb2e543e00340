//! Held-key lamps and speed readout

use super::ThemeColors;
use crate::filter::FilterSnapshot;
use crate::keys::KeyBindings;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

const LAMP_WIDTH: u16 = 11;
const LAMP_HEIGHT: u16 = 3;

/// Two lamps (forward, sprint) lit while the key is held
pub struct KeyIndicators<'a> {
    snapshot: &'a FilterSnapshot,
    bindings: &'a KeyBindings,
    colors: ThemeColors,
}

impl<'a> KeyIndicators<'a> {
    pub fn new(
        snapshot: &'a FilterSnapshot,
        bindings: &'a KeyBindings,
        colors: ThemeColors,
    ) -> Self {
        Self {
            snapshot,
            bindings,
            colors,
        }
    }

    fn render_lamp(&self, buf: &mut Buffer, area: Rect, x: u16, label: &str, held: bool) {
        let (bg, fg) = if held {
            (self.colors.lamp_on, self.colors.lamp_text_on)
        } else {
            (self.colors.lamp_off, self.colors.lamp_text)
        };
        let mut style = Style::default().fg(fg).bg(bg);
        if held {
            style = style.add_modifier(Modifier::BOLD);
        }

        let width = LAMP_WIDTH.min(area.x + area.width - x);
        for row in 0..LAMP_HEIGHT.min(area.height) {
            let text = if row == LAMP_HEIGHT / 2 {
                format!("{:^w$}", label, w = width as usize)
            } else {
                " ".repeat(width as usize)
            };
            buf.set_string(x, area.y + row, text, style);
        }
    }
}

impl<'a> Widget for KeyIndicators<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < LAMP_WIDTH * 2 + 2 || area.height < 1 {
            return;
        }

        let forward = self.bindings.forward.label();
        let sprint = self.bindings.sprint.label();
        self.render_lamp(buf, area, area.x, &forward, self.snapshot.forward_held);
        self.render_lamp(
            buf,
            area,
            area.x + LAMP_WIDTH + 2,
            &sprint,
            self.snapshot.sprint_held,
        );

        let readout_x = area.x + LAMP_WIDTH * 2 + 4;
        if readout_x < area.x + area.width {
            let readout = format!("Smoothed Speed: {:.1} px/s", self.snapshot.displayed_speed);
            let style = Style::default()
                .fg(self.colors.text)
                .add_modifier(Modifier::BOLD);
            buf.set_stringn(
                readout_x,
                area.y + LAMP_HEIGHT.min(area.height) / 2,
                readout,
                (area.x + area.width - readout_x) as usize,
                style,
            );
        }
    }
}
