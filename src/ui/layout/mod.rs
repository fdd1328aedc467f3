//! Screen layout

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::core::frame::DiskPanel;
use crate::core::state::AppState;

/// Rows taken by the header: host line, server line, blank.
const HEADER_HEIGHT: u16 = 3;
const MAX_DISK_ROWS: u16 = 8;

/// Computed rects for every region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedLayout {
    pub header: Rect,
    pub cmdline: Rect,
    pub table: Rect,
    pub disks: Option<Rect>,
    pub overlay_area: Option<Rect>,
}

pub struct LayoutManager;

impl LayoutManager {
    pub fn compute(area: Rect, state: &AppState) -> ComputedLayout {
        let disk_height = if state.show_disks {
            Some(Self::disk_panel_height(state))
        } else {
            None
        };
        Self::split(area, disk_height)
    }

    /// Borders plus a header row plus one row per device, capped.
    fn disk_panel_height(state: &AppState) -> u16 {
        let rows = match state.stats().map(|s| &s.disks) {
            Some(DiskPanel::Rates(rates)) => (rates.len() as u16).clamp(1, MAX_DISK_ROWS),
            _ => 1,
        };
        rows + 3
    }

    fn split(area: Rect, disk_height: Option<u16>) -> ComputedLayout {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Length(1), // Command line
                Constraint::Min(3),    // View table
            ])
            .split(area);

        let (table, disks) = match disk_height {
            Some(height) => {
                let body = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(height), Constraint::Min(3)])
                    .split(main_chunks[2]);
                (body[1], Some(body[0]))
            }
            None => (main_chunks[2], None),
        };

        ComputedLayout {
            header: main_chunks[0],
            cmdline: main_chunks[1],
            table,
            disks,
            overlay_area: Some(Self::centered_rect(60, 70, area)),
        }
    }

    pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_panel_sits_above_table() {
        let area = Rect::new(0, 0, 120, 40);
        let layout = LayoutManager::split(area, Some(6));

        assert_eq!(layout.header.height, HEADER_HEIGHT);
        assert_eq!(layout.cmdline.y, HEADER_HEIGHT);
        let disks = layout.disks.unwrap();
        assert_eq!(disks.height, 6);
        assert_eq!(layout.table.y, disks.y + disks.height);
        assert_eq!(layout.table.height, 40 - HEADER_HEIGHT - 1 - 6);
    }

    #[test]
    fn table_takes_body_without_disks() {
        let area = Rect::new(0, 0, 80, 24);
        let layout = LayoutManager::split(area, None);
        assert!(layout.disks.is_none());
        assert_eq!(layout.table.height, 24 - HEADER_HEIGHT - 1);
    }
}
