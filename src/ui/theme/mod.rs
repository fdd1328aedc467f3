//! Color themes

use ratatui::style::{Color, Modifier, Style};

/// Complete theme definition
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
    pub styles: ThemeStyles,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    pub bg_primary: Color,
    pub bg_secondary: Color,
    pub bg_highlight: Color,

    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_muted: Color,

    pub accent_primary: Color,
    pub accent_secondary: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    pub border: Color,
    pub border_focused: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeStyles {
    pub header: Style,
    pub header_label: Style,
    pub cmdline: Style,
    pub cmdline_error: Style,
    pub panel_title: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub column_header: Style,
    /// Header of the column rows are ordered by.
    pub column_ordered: Style,
    pub row: Style,
    pub unavailable: Style,
    pub keybind: Style,
    pub keybind_key: Style,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "gruvbox" => Self::gruvbox(),
            "nord" => Self::nord(),
            _ => Self::tokyo_night(),
        }
    }

    /// Default theme
    pub fn tokyo_night() -> Self {
        Self::from_colors(
            "Tokyo Night",
            ThemeColors {
                bg_primary: Color::Rgb(26, 27, 38),
                bg_secondary: Color::Rgb(36, 40, 59),
                bg_highlight: Color::Rgb(47, 53, 73),
                fg_primary: Color::Rgb(192, 202, 245),
                fg_secondary: Color::Rgb(169, 177, 214),
                fg_muted: Color::Rgb(86, 95, 137),
                accent_primary: Color::Rgb(122, 162, 247),
                accent_secondary: Color::Rgb(187, 154, 247),
                success: Color::Rgb(158, 206, 106),
                warning: Color::Rgb(224, 175, 104),
                error: Color::Rgb(247, 118, 142),
                info: Color::Rgb(125, 207, 255),
                border: Color::Rgb(41, 46, 66),
                border_focused: Color::Rgb(122, 162, 247),
            },
        )
    }

    pub fn gruvbox() -> Self {
        Self::from_colors(
            "Gruvbox",
            ThemeColors {
                bg_primary: Color::Rgb(40, 40, 40),
                bg_secondary: Color::Rgb(60, 56, 54),
                bg_highlight: Color::Rgb(102, 92, 84),
                fg_primary: Color::Rgb(235, 219, 178),
                fg_secondary: Color::Rgb(213, 196, 161),
                fg_muted: Color::Rgb(168, 153, 132),
                accent_primary: Color::Rgb(131, 165, 152),
                accent_secondary: Color::Rgb(211, 134, 155),
                success: Color::Rgb(184, 187, 38),
                warning: Color::Rgb(250, 189, 47),
                error: Color::Rgb(251, 73, 52),
                info: Color::Rgb(131, 165, 152),
                border: Color::Rgb(80, 73, 69),
                border_focused: Color::Rgb(131, 165, 152),
            },
        )
    }

    pub fn nord() -> Self {
        Self::from_colors(
            "Nord",
            ThemeColors {
                bg_primary: Color::Rgb(46, 52, 64),
                bg_secondary: Color::Rgb(59, 66, 82),
                bg_highlight: Color::Rgb(76, 86, 106),
                fg_primary: Color::Rgb(236, 239, 244),
                fg_secondary: Color::Rgb(229, 233, 240),
                fg_muted: Color::Rgb(216, 222, 233),
                accent_primary: Color::Rgb(136, 192, 208),
                accent_secondary: Color::Rgb(129, 161, 193),
                success: Color::Rgb(163, 190, 140),
                warning: Color::Rgb(235, 203, 139),
                error: Color::Rgb(191, 97, 106),
                info: Color::Rgb(136, 192, 208),
                border: Color::Rgb(67, 76, 94),
                border_focused: Color::Rgb(136, 192, 208),
            },
        )
    }

    fn from_colors(name: &str, colors: ThemeColors) -> Self {
        let styles = ThemeStyles {
            header: Style::default().bg(colors.bg_primary).fg(colors.fg_primary),
            header_label: Style::default()
                .fg(colors.accent_primary)
                .add_modifier(Modifier::BOLD),
            cmdline: Style::default().bg(colors.bg_secondary).fg(colors.fg_secondary),
            cmdline_error: Style::default()
                .bg(colors.bg_secondary)
                .fg(colors.error)
                .add_modifier(Modifier::BOLD),
            panel_title: Style::default()
                .fg(colors.accent_primary)
                .add_modifier(Modifier::BOLD),
            panel_border: Style::default().fg(colors.border),
            panel_border_focused: Style::default().fg(colors.border_focused),
            column_header: Style::default()
                .fg(colors.bg_primary)
                .bg(colors.fg_secondary)
                .add_modifier(Modifier::BOLD),
            column_ordered: Style::default()
                .fg(colors.bg_primary)
                .bg(colors.accent_secondary)
                .add_modifier(Modifier::BOLD),
            row: Style::default().fg(colors.fg_primary),
            unavailable: Style::default().fg(colors.warning),
            keybind: Style::default().fg(colors.fg_muted),
            keybind_key: Style::default()
                .fg(colors.accent_secondary)
                .add_modifier(Modifier::BOLD),
        };

        Self {
            name: name.to_string(),
            colors,
            styles,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::tokyo_night()
    }
}
