//! Command line: messages, filter input and key hints

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::state::{AppMode, AppState, MessageLevel};
use crate::ui::theme::Theme;

pub struct Cmdline<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> Cmdline<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

impl<'a> Widget for Cmdline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.styles.cmdline);

        if let AppMode::Filter { input } = &self.state.mode {
            let line = Line::from(vec![
                Span::styled(" filter: /", self.theme.styles.keybind_key),
                Span::styled(format!("{}_", input), self.theme.styles.cmdline),
            ]);
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        if let Some(message) = &self.state.message {
            let style = match message.level {
                MessageLevel::Info => self.theme.styles.cmdline,
                MessageLevel::Error => self.theme.styles.cmdline_error,
            };
            buf.set_span(
                area.x + 1,
                area.y,
                &Span::styled(message.text.as_str(), style),
                area.width.saturating_sub(2),
            );
            return;
        }

        let bindings = [("←/→", "Order"), ("/", "Filter"), ("B", "Disks"), ("?", "Help"), ("q", "Quit")];
        let mut spans = Vec::new();
        for (i, (key, action)) in bindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", self.theme.styles.keybind));
            }
            spans.push(Span::styled(format!("[{}]", key), self.theme.styles.keybind_key));
            spans.push(Span::styled(format!(" {}", action), self.theme.styles.keybind));
        }
        buf.set_line(area.x + 1, area.y, &Line::from(spans), area.width.saturating_sub(2));
    }
}
