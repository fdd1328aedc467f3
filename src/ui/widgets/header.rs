//! Header widget: host summary and server profile

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::state::AppState;
use crate::ui::theme::Theme;

pub struct Header<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn separator(&self) -> Span<'static> {
        Span::styled(" │ ", Style::default().fg(self.theme.colors.fg_muted))
    }
}

fn host_label(server_is_local: bool) -> &'static str {
    if server_is_local {
        "host "
    } else {
        "client "
    }
}

fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    if days > 0 {
        format!("{}d {:02}:{:02}", days, hours, minutes)
    } else {
        format!("{:02}:{:02}", hours, minutes)
    }
}

impl<'a> Widget for Header<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.styles.header);
        let value = Style::default().fg(self.theme.colors.fg_primary);

        let stats = self.state.stats();
        let taken_at = self
            .state
            .frame
            .as_ref()
            .map(|f| f.taken_at().format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string());

        let mut spans = vec![
            Span::styled(" pgtop ", self.theme.styles.header_label),
            Span::styled(taken_at, value),
        ];

        if let Some(host) = stats.map(|s| &s.host) {
            spans.push(self.separator());
            // For a remote server these figures are the client's, not the server's.
            spans.push(Span::styled(
                host_label(self.state.server_is_local),
                Style::default().fg(self.theme.colors.fg_muted),
            ));
            spans.push(Span::styled(
                format!("up {}", format_uptime(host.uptime_secs)),
                value,
            ));
            spans.push(self.separator());
            spans.push(Span::styled(
                format!(
                    "load {:.2} {:.2} {:.2}",
                    host.load[0], host.load[1], host.load[2]
                ),
                value,
            ));
            spans.push(self.separator());
            spans.push(Span::styled(format!("cpu {:>3.0}%", host.cpu_percent), value));
            spans.push(self.separator());
            spans.push(Span::styled(
                format!("mem {}/{} MB", host.memory_used_mb, host.memory_total_mb),
                value,
            ));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        if area.height < 2 {
            return;
        }

        let profile = &self.state.profile;
        let role = if profile.in_recovery {
            "standby"
        } else {
            "primary"
        };
        let mut server = vec![
            Span::styled(" PostgreSQL ", self.theme.styles.header_label),
            Span::styled(format!("{} ({})", profile.version_string(), role), value),
        ];

        if let Some(view) = self.state.current_view() {
            let column = self
                .state
                .current_result()
                .and_then(|r| match r {
                    crate::core::frame::ViewResult::Rows(rows) => rows.columns.get(view.order_key),
                    crate::core::frame::ViewResult::Unavailable(_) => None,
                })
                .cloned()
                .unwrap_or_else(|| view.order_key.to_string());

            server.push(self.separator());
            server.push(Span::styled(
                view.name,
                Style::default().fg(self.theme.colors.accent_secondary),
            ));
            server.push(Span::styled(
                format!(
                    " order by {} {}",
                    column,
                    if view.order_desc { "desc" } else { "asc" }
                ),
                value,
            ));
            if !view.filters().is_empty() {
                server.push(Span::styled(
                    format!(" filters {}", view.filters().len()),
                    Style::default().fg(self.theme.colors.warning),
                ));
            }
        }
        buf.set_line(area.x, area.y + 1, &Line::from(server), area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::{DiskPanel, Frame, StatFrame};
    use crate::integrations::postgres::{CapabilityProfile, Features};
    use crate::integrations::system::HostSummary;
    use crate::view::{Layout, ViewDefinition, Views};
    use chrono::Local;
    use indexmap::IndexMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn first_line(server_is_local: bool) -> String {
        let views = Views::from_definitions([ViewDefinition::new(
            "things",
            "Show things",
            Layout::new("", 1, None),
        )]);
        let profile = CapabilityProfile {
            version: 150000,
            in_recovery: false,
            features: Features::default(),
            application_name: "pgtop".into(),
        };
        let theme = Theme::default();
        let mut state = AppState::new(
            views,
            profile,
            Theme::default(),
            false,
            Duration::from_secs(1),
        );
        state.server_is_local = server_is_local;
        state.frame = Some(Arc::new(Frame::Stats(StatFrame {
            taken_at: Local::now(),
            host: HostSummary {
                uptime_secs: 3_660,
                ..Default::default()
            },
            disks: DiskPanel::Pending,
            views: IndexMap::new(),
        })));

        let area = Rect::new(0, 0, 120, 2);
        let mut buf = Buffer::empty(area);
        Header::new(&state, &theme).render(area, &mut buf);
        (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect()
    }

    #[test]
    fn host_summary_is_labelled_by_where_the_server_runs() {
        assert!(first_line(true).contains("host up 01:01"));
        let remote = first_line(false);
        assert!(remote.contains("client up 01:01"), "{remote}");
        assert!(!remote.contains("host up"));
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(59), "00:00");
        assert_eq!(format_uptime(3_660), "01:01");
        assert_eq!(format_uptime(90_000), "1d 01:00");
    }
}
