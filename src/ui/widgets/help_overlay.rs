//! Help overlay widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::core::events::KeyBindings;
use crate::ui::theme::Theme;

pub struct HelpOverlay<'a> {
    theme: &'a Theme,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl<'a> Widget for HelpOverlay<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .title(Span::styled(" pgtop help ", self.theme.styles.panel_title))
            .borders(Borders::ALL)
            .border_style(self.theme.styles.panel_border_focused)
            .style(Style::default().bg(self.theme.colors.bg_secondary));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut y = inner.y;
        for (key, desc) in KeyBindings::help_entries() {
            if y >= inner.y + inner.height {
                break;
            }
            let line = Line::from(vec![
                Span::styled(format!("  {:>14}  ", key), self.theme.styles.keybind_key),
                Span::styled(desc, self.theme.styles.keybind),
            ]);
            buf.set_line(inner.x + 1, y, &line, inner.width.saturating_sub(2));
            y += 1;
        }

        if area.height < 2 || area.width < 26 {
            return;
        }
        let footer = Span::styled(
            " Press Esc or ? to close ",
            Style::default().fg(self.theme.colors.fg_muted),
        );
        buf.set_span(
            area.x + (area.width - 25) / 2,
            area.y + area.height - 1,
            &footer,
            25,
        );
    }
}
