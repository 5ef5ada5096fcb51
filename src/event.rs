use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use std::time::Instant;

use crate::app::{App, PanelFocus};
use crate::error::Result;
use crate::input::{Key, KeyInput};

/// Route a terminal event into the app. Returns true if the UI needs a redraw.
pub fn handle_event(event: Event, app: &mut App) -> Result<bool> {
    let state_before = app.ui_state_hash();

    match event {
        Event::Key(key) => {
            if key.kind != KeyEventKind::Press {
                return Ok(false);
            }
            if handle_global_key(&key, app) {
                return Ok(true);
            }
            handle_key_input(app, KeyInput::from(key));
        }
        Event::Mouse(mouse) => {
            if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                if let Some(id) = app.node_at(mouse.column, mouse.row) {
                    app.press_node(id, mouse.modifiers.into(), Instant::now());
                }
            }
        }
        Event::Resize(_, _) => return Ok(true),
        _ => {}
    }

    Ok(state_before != app.ui_state_hash())
}

fn handle_global_key(key: &KeyEvent, app: &mut App) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.should_quit = true;
            true
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            true
        }
        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.ui.force_redraw = true;
            app.ui.status_message = "Screen refreshed".to_string();
            true
        }
        _ => false,
    }
}

/// Deliver a key to whichever panel has focus. Tab the tree lets through
/// moves focus to the next panel.
pub fn handle_key_input(app: &mut App, input: KeyInput) {
    match app.ui.active_panel {
        PanelFocus::Tree => {
            let outcome = app.handle_tree_key(input);
            if !outcome.is_handled() && input.key == Key::Tab {
                app.next_panel();
            }
        }
        PanelFocus::Details => {
            if input.key == Key::Tab {
                app.next_panel();
            }
        }
    }
}
