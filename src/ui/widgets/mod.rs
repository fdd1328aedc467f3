//! UI Widgets

pub mod cmdline;
pub mod disk_panel;
pub mod header;
pub mod help_overlay;
pub mod stats_table;

pub use cmdline::Cmdline;
pub use disk_panel::DiskPanelWidget;
pub use header::Header;
pub use help_overlay::HelpOverlay;
pub use stats_table::StatsTable;

use unicode_width::UnicodeWidthChar;

/// Pad or cut `value` to exactly `width` terminal cells.
pub(crate) fn fit(value: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for c in value.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.extend(std::iter::repeat(' ').take(width - used));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 3), "abc");
        assert_eq!(fit("日本語", 5), "日本 ");
    }
}
