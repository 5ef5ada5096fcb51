use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AriaTreeError, Result};
use crate::input::KeyInput;

/// Represents all user commands that can be executed against an app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Deliver a key to the focused panel
    Key(KeyInput),
    /// Click the first node with this label
    Click(String),
    /// Double-click the first node with this label
    DoubleClick(String),
    /// Move focus into the tree
    Focus,
    /// Move focus out of the tree
    Blur,
    NextPanel,
    Quit,

    // Multi-step commands for testing
    Sequence(Vec<Command>),
}

impl Command {
    /// Parse a command from a string representation
    pub fn from_string(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "quit" => return Ok(Command::Quit),
            "focus" => return Ok(Command::Focus),
            "blur" => return Ok(Command::Blur),
            "next_panel" => return Ok(Command::NextPanel),
            _ => {}
        }

        if let Some(name) = s.strip_prefix("key:") {
            return Ok(Command::Key(KeyInput::parse(name)?));
        }
        if let Some(rest) = s.strip_prefix("char:") {
            let mut chars = rest.chars();
            return match (chars.next(), chars.next()) {
                (Some(ch), None) => Ok(Command::Key(KeyInput::char(ch))),
                _ => Err(AriaTreeError::Command(format!("char: expects one character, got '{}'", rest))),
            };
        }
        if let Some(label) = s.strip_prefix("click:") {
            return Ok(Command::Click(label.to_string()));
        }
        if let Some(label) = s.strip_prefix("dblclick:") {
            return Ok(Command::DoubleClick(label.to_string()));
        }

        if let Some(inner) = s.strip_prefix("sequence:[").and_then(|rest| rest.strip_suffix(']')) {
            if inner.trim().is_empty() {
                return Ok(Command::Sequence(vec![]));
            }

            let mut commands = Vec::new();
            for cmd_str in inner.split(',') {
                let cmd_str = cmd_str.trim();
                let command = Command::from_string(cmd_str).map_err(|e| {
                    AriaTreeError::Command(format!("in sequence '{}': {}", cmd_str, e))
                })?;
                commands.push(command);
            }
            return Ok(Command::Sequence(commands));
        }

        // Bare key names: "down", "shift+tab", "*"
        KeyInput::parse(s)
            .map(Command::Key)
            .map_err(|_| AriaTreeError::Command(format!("Unknown command: {}", s)))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Key(input) => write!(f, "key:{}", input),
            Command::Click(label) => write!(f, "click:{}", label),
            Command::DoubleClick(label) => write!(f, "dblclick:{}", label),
            Command::Focus => write!(f, "focus"),
            Command::Blur => write!(f, "blur"),
            Command::NextPanel => write!(f, "next_panel"),
            Command::Quit => write!(f, "quit"),
            Command::Sequence(commands) => {
                let parts: Vec<String> = commands.iter().map(|c| c.to_string()).collect();
                write!(f, "sequence:[{}]", parts.join(","))
            }
        }
    }
}
