use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, PanelFocus};
use crate::theme::{get_theme, Theme};
use crate::tree::{TreeNode, Tree};

/// Number of recent selections listed in the details panel
const RECENT_SELECTIONS: usize = 5;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let theme = get_theme();

    let status_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    if app.config.layout.show_details {
        let tree_width = app.config.layout.tree_panel_width.min(100);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(tree_width),
                Constraint::Percentage(100 - tree_width),
            ])
            .split(status_chunks[0]);

        draw_tree(frame, app, chunks[0], &theme);
        draw_details(frame, app, chunks[1], &theme);
    } else {
        draw_tree(frame, app, status_chunks[0], &theme);
    }
    draw_status_bar(frame, app, status_chunks[1], &theme);
}

fn panel_block<'a>(title: &'a str, is_active: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_active {
        Style::default().fg(theme.active_border)
    } else {
        Style::default().fg(theme.inactive_border)
    };

    Block::default()
        .title(Span::styled(title, Style::default().fg(theme.panel_title)))
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// One list row: indentation, the expand indicator for group owners, the label
fn tree_row(tree: &Tree, node: &TreeNode, indent_width: usize, theme: &Theme) -> ListItem<'static> {
    let indent = " ".repeat(node.depth() * indent_width);
    let mut spans = vec![Span::raw(indent)];

    match node.indicator() {
        Some(indicator) => {
            spans.push(Span::styled(
                format!("{} ", tree.indicators().glyph(indicator)),
                Style::default().fg(theme.indicator),
            ));
            spans.push(Span::styled(
                node.label().to_string(),
                Style::default().fg(theme.group_owner).add_modifier(Modifier::BOLD),
            ));
        }
        None => {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                node.label().to_string(),
                Style::default().fg(theme.item_default),
            ));
        }
    }

    ListItem::new(Line::from(spans))
}

fn draw_tree(frame: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    app.ui.tree_area = area;
    let is_active = app.is_tree_focused();
    let title = format!(" Tree ({}) ", app.tree.tree().root_role().as_str());
    let block = panel_block(&title, is_active, theme);

    let tree = app.tree.tree();
    if tree.is_empty() {
        let paragraph = Paragraph::new("No items")
            .block(block)
            .style(Style::default().fg(theme.history_entry));
        frame.render_widget(paragraph, area);
        return;
    }

    let indent_width = app.config.layout.indent_width;
    let items: Vec<ListItem> = tree
        .visible_nodes()
        .iter()
        .filter_map(|&id| tree.node(id))
        .map(|node| tree_row(tree, node, indent_width, theme))
        .collect();

    // The focused tree shows the active item strongly, an unfocused one dimmed
    let highlight_style = if is_active {
        Style::default()
            .bg(theme.item_selected_bg)
            .fg(theme.item_selected_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(theme.item_selected_unfocused_bg)
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style)
        .highlight_symbol("");

    let selected_index = app
        .tree
        .active_node()
        .and_then(|id| app.tree.tree().visible_index(id));
    app.tree_list_state.select(selected_index);
    frame.render_stateful_widget(list, area, &mut app.tree_list_state);
}

fn attribute_line(name: &str, value: String, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<14}", name), Style::default().fg(theme.attribute_name)),
        Span::styled(value, Style::default().fg(theme.attribute_value)),
    ])
}

fn optional_flag(value: Option<bool>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn draw_details(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let is_active = app.ui.active_panel == PanelFocus::Details;
    let block = panel_block(" Details ", is_active, theme);
    let tree = app.tree.tree();

    let mut lines = Vec::new();
    match app.tree.active() {
        Some(node) => {
            let aria = node.aria();
            lines.push(attribute_line("label", node.label().to_string(), theme));
            if let Some(dom_id) = node.dom_id() {
                lines.push(attribute_line("id", dom_id.to_string(), theme));
            }
            lines.push(attribute_line("role", aria.role.as_str().to_string(), theme));
            lines.push(attribute_line("tabindex", aria.tab_index.to_string(), theme));
            lines.push(attribute_line("aria-selected", optional_flag(aria.selected), theme));
            lines.push(attribute_line("aria-expanded", optional_flag(aria.expanded), theme));
            if node.has_children() {
                lines.push(attribute_line("group hidden", optional_flag(aria.group_hidden), theme));
            }
            lines.push(attribute_line("level", (node.depth() + 1).to_string(), theme));
        }
        None => lines.push(Line::from(Span::styled(
            "No active item",
            Style::default().fg(theme.history_entry),
        ))),
    }

    lines.push(Line::from(""));
    lines.push(attribute_line(
        "visible",
        format!("{} of {}", tree.visible_nodes().len(), tree.len()),
        theme,
    ));

    let history = app.tree.listener().history();
    lines.push(attribute_line("selections", history.len().to_string(), theme));
    for id in history.iter().rev().take(RECENT_SELECTIONS) {
        let label = tree.label(*id).unwrap_or("?");
        lines.push(Line::from(Span::styled(
            format!("  {} {}", id, label),
            Style::default().fg(theme.history_entry),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(theme.text_default));
    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let help_text = match app.ui.active_panel {
        PanelFocus::Tree => "Tab: Switch panel | ↑↓: Move | →←: Expand/Collapse | *: Expand all | a-z: Jump | Esc: Quit",
        PanelFocus::Details => "Tab: Switch panel | Esc: Quit",
    };

    let status_line = Line::from(vec![
        Span::styled(app.ui.status_message.clone(), Style::default().fg(theme.status_bar_fg)),
        Span::raw(" | "),
        Span::styled(help_text, Style::default().fg(theme.status_help_text)),
    ]);

    let paragraph = Paragraph::new(status_line).style(Style::default().bg(theme.status_bar_bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::input::{Key, KeyInput};
    use crate::screenshot::render_to_string;

    fn sample_app() -> App {
        App::sample(Config::default()).unwrap()
    }

    #[test]
    fn test_tree_rows_show_indicators_and_indentation() {
        let mut app = sample_app();
        let screen = render_to_string(&mut app, 80, 20).unwrap();

        assert!(screen.contains("▼ Science"));
        assert!(screen.contains("    Biology"));
        assert!(screen.contains("  ▼ Physics"));
        assert!(screen.contains("Languages"));
        assert!(screen.contains("Tree (tree)"));
    }

    #[test]
    fn test_collapsed_group_hides_children() {
        let mut app = sample_app();
        app.focus_tree();
        app.handle_tree_key(KeyInput::new(Key::Left));
        let screen = render_to_string(&mut app, 80, 20).unwrap();

        assert!(screen.contains("▶ Science"));
        assert!(!screen.contains("Biology"));
        assert!(screen.contains("5 of 10"));
    }

    #[test]
    fn test_details_show_active_attributes() {
        let mut app = sample_app();
        app.focus_tree();
        let screen = render_to_string(&mut app, 100, 20).unwrap();

        assert!(screen.contains("aria-selected true"));
        assert!(screen.contains("role          group"));
        assert!(screen.contains("tabindex      0"));
    }

    #[test]
    fn test_tree_area_recorded_for_hit_testing() {
        let mut app = sample_app();
        render_to_string(&mut app, 80, 20).unwrap();

        assert_eq!(app.ui.tree_area, Rect::new(0, 0, 40, 19));
        assert_eq!(app.node_at(3, 1), app.tree.tree().find_by_label("Science"));
    }

    #[test]
    fn test_details_hidden_by_config() {
        let mut config = Config::default();
        config.layout.show_details = false;
        let mut app = App::sample(config).unwrap();
        let screen = render_to_string(&mut app, 80, 20).unwrap();

        assert!(!screen.contains("Details"));
        assert_eq!(app.ui.tree_area.width, 80);
    }
}
