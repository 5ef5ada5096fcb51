use crate::{
    app::App,
    command::Command,
    config::Config,
    error::{AriaTreeError, Result},
    event::handle_key_input,
    input::Modifiers,
    session::SessionState,
    tree::NodeId,
};

/// Result of executing a command
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub state: SessionState,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

/// Executes commands against saved sessions or live apps
pub struct Executor;

impl Executor {
    /// Execute a command against a session and return the resulting session
    pub fn execute(state: &SessionState, config: &Config, command: &Command) -> Result<ExecutionResult> {
        let mut app = App::from_session(state, config.clone())?;
        Self::apply(&mut app, command)?;

        let status_message = if app.ui.status_message.is_empty() {
            None
        } else {
            Some(app.ui.status_message.clone())
        };

        Ok(ExecutionResult {
            state: SessionState::from_app(&app),
            status_message,
            should_quit: app.should_quit,
        })
    }

    /// Apply a command to a live app, the way the terminal would deliver it
    pub fn apply(app: &mut App, command: &Command) -> Result<()> {
        log::debug!("Executor: applying {}", command);

        match command {
            Command::Key(input) => handle_key_input(app, *input),
            Command::Click(label) => {
                let id = Self::visible_node(app, label)?;
                app.click_node(id, Modifiers::NONE);
            }
            Command::DoubleClick(label) => {
                let id = Self::visible_node(app, label)?;
                app.double_click_node(id, Modifiers::NONE);
            }
            Command::Focus => app.focus_tree(),
            Command::Blur => {
                if app.is_tree_focused() {
                    app.blur_tree();
                }
            }
            Command::NextPanel => app.next_panel(),
            Command::Quit => {
                app.should_quit = true;
                app.ui.status_message = "Goodbye!".to_string();
            }
            Command::Sequence(commands) => {
                for command in commands {
                    Self::apply(app, command)?;
                    if app.should_quit {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Only drawn rows can be clicked
    fn visible_node(app: &App, label: &str) -> Result<NodeId> {
        let tree = app.tree.tree();
        let id = tree
            .find_by_label(label)
            .ok_or_else(|| AriaTreeError::Command(format!("No item labelled '{}'", label)))?;
        if tree.visible_index(id).is_none() {
            return Err(AriaTreeError::Command(format!("Item '{}' is not visible", label)));
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PanelFocus;
    use crate::input::{Key, KeyInput};
    use assert_matches::assert_matches;

    fn run(state: &SessionState, command: &str) -> ExecutionResult {
        let command = Command::from_string(command).unwrap();
        Executor::execute(state, &Config::default(), &command).unwrap()
    }

    #[test]
    fn test_next_panel() {
        let state = SessionState::default();

        let result = run(&state, "next_panel");
        assert_eq!(result.state.active_panel, PanelFocus::Details);
        assert!(result.status_message.is_some());
        assert!(!result.should_quit);
    }

    #[test]
    fn test_quit_command() {
        let result = run(&SessionState::default(), "quit");
        assert!(result.should_quit);
        assert_eq!(result.status_message.as_deref(), Some("Goodbye!"));
    }

    #[test]
    fn test_key_moves_active_and_records_selection() {
        let result = run(&SessionState::default(), "key:end");
        assert_eq!(result.state.active, Some(9));
        assert_eq!(result.state.selections, vec![9]);
        assert_eq!(result.status_message.as_deref(), Some("Selected: Languages"));
    }

    #[test]
    fn test_commands_chain_through_state() {
        let state = SessionState::default();
        let state = run(&state, "focus").state;
        let state = run(&state, "key:left").state;
        assert_eq!(state.collapsed, vec![0]);

        let state = run(&state, "char:l").state;
        assert_eq!(state.active, Some(9));
        assert_eq!(state.selections, vec![0, 9]);
    }

    #[test]
    fn test_char_space_and_asterisk_act_on_groups() {
        let state = run(&SessionState::default(), "focus").state;
        let collapsed = run(&state, "char: ").state;
        assert_eq!(collapsed.collapsed, vec![0]);
        assert_eq!(collapsed.visible.len(), 5);

        let expanded = run(&collapsed, "char:*").state;
        assert!(expanded.collapsed.is_empty());
        assert_eq!(expanded.visible.len(), 10);
    }

    #[test]
    fn test_double_click_toggles_group() {
        let result = run(&SessionState::default(), "dblclick:Physics");
        assert_eq!(result.state.collapsed, vec![3]);
        assert_eq!(result.state.active, Some(3));
        assert_eq!(result.state.visible.len(), 8);
    }

    #[test]
    fn test_click_unknown_or_hidden_label_fails() {
        let command = Command::Click("Nope".to_string());
        let err = Executor::execute(&SessionState::default(), &Config::default(), &command).unwrap_err();
        assert_matches!(err, AriaTreeError::Command(_));

        let mut state = SessionState::default();
        state.collapsed = vec![0];
        let command = Command::Click("Biology".to_string());
        assert!(Executor::execute(&state, &Config::default(), &command).is_err());
    }

    #[test]
    fn test_sequence_command() {
        let mut app = App::sample(Config::default()).unwrap();
        let sequence = Command::Sequence(vec![
            Command::Focus,
            Command::Key(KeyInput::new(Key::Asterisk)),
            Command::Key(KeyInput::new(Key::Down)),
            Command::Quit,
            Command::Key(KeyInput::new(Key::Down)),
        ]);

        Executor::apply(&mut app, &sequence).unwrap();
        assert_eq!(app.active_label(), Some("Biology"));
        assert!(app.should_quit);
    }

    #[test]
    fn test_blur_outside_tree_is_noop() {
        let mut app = App::sample(Config::default()).unwrap();
        app.ui.active_panel = PanelFocus::Details;
        app.ui.status_message = "unchanged".to_string();

        Executor::apply(&mut app, &Command::Blur).unwrap();
        assert_eq!(app.ui.status_message, "unchanged");
    }
}
