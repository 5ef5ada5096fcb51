use ratatui::style::Color;

/// Theme data structure containing all colors used in the application
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub active_border: Color,
    pub inactive_border: Color,

    // Tree panel
    pub item_selected_bg: Color,
    pub item_selected_fg: Color,
    pub item_selected_unfocused_bg: Color,
    pub group_owner: Color,
    pub indicator: Color,
    pub item_default: Color,

    // Details panel
    pub attribute_name: Color,
    pub attribute_value: Color,
    pub history_entry: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_help_text: Color,

    // General UI
    pub panel_title: Color,
    pub text_default: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            // Panel borders
            active_border: Color::Yellow,
            inactive_border: Color::DarkGray,

            // Tree panel
            item_selected_bg: Color::White,
            item_selected_fg: Color::Black,
            item_selected_unfocused_bg: Color::DarkGray,
            group_owner: Color::Blue,
            indicator: Color::Cyan,
            item_default: Color::Reset,

            // Details panel
            attribute_name: Color::Green,
            attribute_value: Color::Yellow,
            history_entry: Color::Gray,

            // Status bar
            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_help_text: Color::Gray,

            // General UI
            panel_title: Color::Gray,
            text_default: Color::Reset,
        }
    }
}

/// Get the current theme
pub fn get_theme() -> Theme {
    Theme::default()
}
