use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::fs;
use std::path::Path;

use crate::{app::App, config::Config, error::Result, session::SessionState, ui};

/// Render the app once into an off-screen buffer and return it as text
pub fn render_to_string(app: &mut App, width: u16, height: u16) -> Result<String> {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;

    terminal.draw(|frame| {
        ui::draw(frame, app);
    })?;

    Ok(buffer_to_string(terminal.backend().buffer()))
}

pub fn generate_screenshot(
    state_path: &Path,
    output_path: Option<&Path>,
    width: u16,
    height: u16,
    config: &Config,
) -> Result<()> {
    let state = SessionState::load_from_file(state_path)?;
    let mut app = App::from_session(&state, config.clone())?;

    let screenshot = render_to_string(&mut app, width, height)?;

    match output_path {
        Some(path) => {
            fs::write(path, screenshot)?;
            println!("Screenshot saved to: {}", path.display());
        }
        None => {
            print!("{}", screenshot);
        }
    }

    Ok(())
}

pub fn buffer_to_string(buffer: &Buffer) -> String {
    let mut result = String::new();

    for y in 0..buffer.area().height {
        for x in 0..buffer.area().width {
            let sym = buffer[(x, y)].symbol();

            // Empty cells become spaces so rows keep their width
            if sym.is_empty() {
                result.push(' ');
            } else {
                result.push_str(sym);
            }
        }
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_to_string() {
        let backend = TestBackend::new(10, 3);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                use ratatui::{
                    text::Text,
                    widgets::{Block, Borders, Paragraph},
                };

                let paragraph =
                    Paragraph::new(Text::from("Test")).block(Block::default().borders(Borders::ALL));
                frame.render_widget(paragraph, frame.area());
            })
            .unwrap();

        let result = buffer_to_string(terminal.backend().buffer());

        assert!(result.contains("Test"));
        assert_eq!(result.lines().count(), 3);
        assert!(result.lines().all(|line| line.chars().count() == 10));
    }

    #[test]
    fn test_generate_screenshot_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("state.json");
        let output_path = dir.path().join("screen.txt");

        let mut state = SessionState::default();
        state.collapsed = vec![6];
        state.active = Some(6);
        state.save_to_file(&state_path).unwrap();

        generate_screenshot(&state_path, Some(output_path.as_path()), 80, 20, &Config::default())
            .unwrap();

        let screen = fs::read_to_string(&output_path).unwrap();
        assert!(screen.contains("▶ Arts"));
        assert!(!screen.contains("Music"));
        assert_eq!(screen.lines().count(), 20);
    }
}
