//! Block device I/O rates

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, Borders, Widget},
};

use crate::core::frame::DiskPanel;
use crate::core::state::AppState;
use crate::stat::DiskRates;
use crate::ui::theme::Theme;

const COLUMNS: &str =
    "Device      rrqm/s  wrqm/s     r/s     w/s   rMB/s   wMB/s  avgrq-sz avgqu-sz   await r_await w_await  %util";

pub struct DiskPanelWidget<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> DiskPanelWidget<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

fn format_rates(r: &DiskRates) -> String {
    format!(
        "{:<10} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>9.2} {:>8.2} {:>7.2} {:>7.2} {:>7.2} {:>6.2}",
        r.device,
        r.reads_merged_per_sec,
        r.writes_merged_per_sec,
        r.reads_per_sec,
        r.writes_per_sec,
        r.read_mb_per_sec,
        r.write_mb_per_sec,
        r.avg_request_size,
        r.avg_queue_size,
        r.await_ms,
        r.read_await_ms,
        r.write_await_ms,
        r.utilization,
    )
}

impl<'a> Widget for DiskPanelWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(" disks ", self.theme.styles.panel_title))
            .borders(Borders::TOP)
            .border_style(self.theme.styles.panel_border)
            .style(Style::default().bg(self.theme.colors.bg_primary));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        let muted = Style::default().fg(self.theme.colors.fg_muted);
        match self.state.stats().map(|s| &s.disks) {
            Some(DiskPanel::Rates(rates)) => {
                buf.set_span(
                    inner.x,
                    inner.y,
                    &Span::styled(COLUMNS, self.theme.styles.column_header),
                    inner.width,
                );
                for (offset, r) in rates
                    .iter()
                    .take(inner.height.saturating_sub(1) as usize)
                    .enumerate()
                {
                    buf.set_span(
                        inner.x,
                        inner.y + 1 + offset as u16,
                        &Span::styled(format_rates(r), self.theme.styles.row),
                        inner.width,
                    );
                }
            }
            Some(DiskPanel::Unavailable(reason)) => {
                buf.set_span(
                    inner.x + 1,
                    inner.y,
                    &Span::styled(format!("not available: {}", reason), self.theme.styles.unavailable),
                    inner.width.saturating_sub(1),
                );
            }
            Some(DiskPanel::Pending) | None => {
                buf.set_span(
                    inner.x + 1,
                    inner.y,
                    &Span::styled("collecting...", muted),
                    inner.width.saturating_sub(1),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_line_up_with_columns() {
        let line = format_rates(&DiskRates {
            device: "sda".into(),
            utilization: 12.5,
            ..Default::default()
        });
        assert_eq!(line.len(), COLUMNS.len());
        assert!(line.starts_with("sda "));
        assert!(line.ends_with(" 12.50"));
    }
}
