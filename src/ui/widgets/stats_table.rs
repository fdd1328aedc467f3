//! Current view's rows, sorted, filtered and aligned

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use super::fit;
use crate::core::frame::ViewResult;
use crate::core::state::AppState;
use crate::integrations::postgres::RowSet;
use crate::ui::theme::Theme;
use crate::view::ViewDefinition;

pub struct StatsTable<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> StatsTable<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn render_rows(&self, view: &ViewDefinition, set: &RowSet, area: Rect, buf: &mut Buffer) {
        let widths: Vec<usize> = (0..set.columns.len())
            .map(|i| view.column_width(i).max(1))
            .collect();

        let header: Vec<Span> = set
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let style = if i == view.order_key {
                    self.theme.styles.column_ordered
                } else {
                    self.theme.styles.column_header
                };
                Span::styled(format!("{} ", fit(name, widths[i])), style)
            })
            .collect();
        buf.set_line(area.x, area.y, &Line::from(header), area.width);

        let rows = view.arrange(set);
        for (offset, row) in rows.iter().take(area.height.saturating_sub(1) as usize).enumerate() {
            let text: String = row
                .iter()
                .zip(&widths)
                .map(|(value, width)| format!("{} ", fit(value, *width)))
                .collect();
            buf.set_span(
                area.x,
                area.y + 1 + offset as u16,
                &Span::styled(text, self.theme.styles.row),
                area.width,
            );
        }
    }
}

impl<'a> Widget for StatsTable<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(view) = self.state.current_view() else {
            return;
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", view.name), self.theme.styles.panel_title))
            .borders(Borders::TOP)
            .border_style(self.theme.styles.panel_border)
            .style(Style::default().bg(self.theme.colors.bg_primary));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        match self.state.current_result() {
            Some(ViewResult::Rows(set)) => self.render_rows(view, set, inner, buf),
            Some(ViewResult::Unavailable(reason)) => {
                buf.set_span(
                    inner.x + 1,
                    inner.y,
                    &Span::styled(format!("not available: {}", reason), self.theme.styles.unavailable),
                    inner.width.saturating_sub(1),
                );
            }
            None => {
                buf.set_span(
                    inner.x + 1,
                    inner.y,
                    &Span::styled(
                        "waiting for statistics...",
                        Style::default().fg(self.theme.colors.fg_muted),
                    ),
                    inner.width.saturating_sub(1),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::{DiskPanel, Frame, StatFrame};
    use crate::integrations::postgres::{CapabilityProfile, Features};
    use crate::integrations::system::HostSummary;
    use crate::view::{Layout, Views};
    use indexmap::IndexMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn renders_sorted_rows_under_header() {
        let views = Views::from_definitions([ViewDefinition::new(
            "things",
            "Show things",
            Layout::new("", 2, None),
        )]);
        let profile = CapabilityProfile {
            version: 150000,
            in_recovery: false,
            features: Features::default(),
            application_name: "pgtop".into(),
        };
        let mut state = AppState::new(
            views,
            profile,
            Theme::default(),
            false,
            Duration::from_secs(1),
        );

        let set = RowSet {
            columns: vec!["n".into(), "name".into()],
            rows: vec![
                vec!["1".into(), "low".into()],
                vec!["20".into(), "high".into()],
            ],
        };
        let mut results = IndexMap::new();
        results.insert("things", ViewResult::Rows(set));
        state.apply_frame(Arc::new(Frame::Stats(StatFrame {
            taken_at: chrono::Local::now(),
            host: HostSummary::default(),
            disks: DiskPanel::Pending,
            views: results,
        })));

        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        let theme = Theme::default();
        StatsTable::new(&state, &theme).render(area, &mut buf);

        assert_eq!(line(&buf, 1), "n  name");
        assert_eq!(line(&buf, 2), "20 high");
        assert_eq!(line(&buf, 3), "1  low");
    }
}
