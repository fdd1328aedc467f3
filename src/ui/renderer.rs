//! Main UI renderer

use ratatui::Frame;

use crate::core::state::{AppMode, AppState};
use crate::ui::layout::LayoutManager;
use crate::ui::widgets::*;

pub struct Renderer;

impl Renderer {
    pub fn render(frame: &mut Frame, state: &AppState) {
        let area = frame.area();
        let theme = &state.theme;

        frame.render_widget(
            ratatui::widgets::Block::default()
                .style(ratatui::style::Style::default().bg(theme.colors.bg_primary)),
            area,
        );

        let layout = LayoutManager::compute(area, state);

        frame.render_widget(Header::new(state, theme), layout.header);
        frame.render_widget(Cmdline::new(state, theme), layout.cmdline);

        if let Some(disk_area) = layout.disks {
            frame.render_widget(DiskPanelWidget::new(state, theme), disk_area);
        }

        frame.render_widget(StatsTable::new(state, theme), layout.table);

        if state.mode == AppMode::Help {
            if let Some(overlay_area) = layout.overlay_area {
                frame.render_widget(HelpOverlay::new(theme), overlay_area);
            }
        }
    }
}
