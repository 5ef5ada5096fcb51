//! Input model for the tree: keys, modifier chords and the outcome of
//! handling an event.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AriaTreeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Tab,
    Enter,
    Space,
    PageUp,
    PageDown,
    End,
    Home,
    Left,
    Up,
    Right,
    Down,
    Asterisk,
    Escape,
    Backspace,
    Char(char),
    Other,
}

impl Key {
    /// Key for a typed character; space and `*` have keys of their own
    pub fn from_char(c: char) -> Self {
        match c {
            ' ' => Key::Space,
            '*' => Key::Asterisk,
            c => Key::Char(c),
        }
    }

    /// The character a key-press would deliver for this key
    pub fn printable(&self) -> Option<char> {
        match self {
            Key::Char(c) => Some(*c),
            Key::Space => Some(' '),
            Key::Asterisk => Some('*'),
            _ => None,
        }
    }

    /// Keys the tree moves through or acts on; a key-press for these is
    /// swallowed even when the key-down phase did nothing.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Key::Enter | Key::Home | Key::End | Key::Left | Key::Right | Key::Up | Key::Down
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        alt: false,
        ctrl: false,
        shift: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        alt: false,
        ctrl: false,
        shift: true,
    };
    pub const CTRL: Modifiers = Modifiers {
        alt: false,
        ctrl: true,
        shift: false,
    };
    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ctrl: false,
        shift: false,
    };

    pub fn any(&self) -> bool {
        self.alt || self.ctrl || self.shift
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(modifiers: KeyModifiers) -> Self {
        Self {
            alt: modifiers.contains(KeyModifiers::ALT),
            ctrl: modifiers.contains(KeyModifiers::CONTROL),
            shift: modifiers.contains(KeyModifiers::SHIFT),
        }
    }
}

/// A key together with the modifiers held while it was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn char(c: char) -> Self {
        Self::new(Key::from_char(c))
    }

    /// Parse the textual form used by scripts: `down`, `shift+tab`,
    /// `ctrl+a`, `*`, `space`, or a single character.
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(AriaTreeError::Command("empty key name".to_string()));
        }

        let mut modifiers = Modifiers::NONE;
        let mut rest = name;
        // A lone "+" is a key, not a separator
        while let Some((prefix, tail)) = rest.split_once('+').filter(|(_, tail)| !tail.is_empty()) {
            match prefix.to_ascii_lowercase().as_str() {
                "shift" => modifiers.shift = true,
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                _ => break,
            }
            rest = tail;
        }

        let key = match rest.to_ascii_lowercase().as_str() {
            "tab" => Key::Tab,
            "enter" | "return" => Key::Enter,
            "space" => Key::Space,
            "pageup" | "page_up" => Key::PageUp,
            "pagedown" | "page_down" => Key::PageDown,
            "end" => Key::End,
            "home" => Key::Home,
            "left" => Key::Left,
            "up" => Key::Up,
            "right" => Key::Right,
            "down" => Key::Down,
            "*" | "asterisk" | "star" => Key::Asterisk,
            "esc" | "escape" => Key::Escape,
            "backspace" => Key::Backspace,
            _ => {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::from_char(c),
                    _ => return Err(AriaTreeError::Command(format!("Unknown key: {}", name))),
                }
            }
        };

        Ok(Self { key, modifiers })
    }
}

impl From<KeyEvent> for KeyInput {
    fn from(event: KeyEvent) -> Self {
        let mut modifiers = Modifiers::from(event.modifiers);
        let key = match event.code {
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => {
                modifiers.shift = true;
                Key::Tab
            }
            KeyCode::Enter => Key::Enter,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::End => Key::End,
            KeyCode::Home => Key::Home,
            KeyCode::Left => Key::Left,
            KeyCode::Up => Key::Up,
            KeyCode::Right => Key::Right,
            KeyCode::Down => Key::Down,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Char(c) => {
                let key = Key::from_char(c);
                if key == Key::Asterisk {
                    // Terminals report '*' with SHIFT on most layouts
                    modifiers.shift = false;
                }
                key
            }
            _ => Key::Other,
        };
        Self { key, modifiers }
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "shift+")?;
        }
        match self.key {
            Key::Tab => write!(f, "tab"),
            Key::Enter => write!(f, "enter"),
            Key::Space => write!(f, "space"),
            Key::PageUp => write!(f, "pageup"),
            Key::PageDown => write!(f, "pagedown"),
            Key::End => write!(f, "end"),
            Key::Home => write!(f, "home"),
            Key::Left => write!(f, "left"),
            Key::Up => write!(f, "up"),
            Key::Right => write!(f, "right"),
            Key::Down => write!(f, "down"),
            Key::Asterisk => write!(f, "*"),
            Key::Escape => write!(f, "escape"),
            Key::Backspace => write!(f, "backspace"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Other => write!(f, "other"),
        }
    }
}

/// What the host should do with an event after the tree saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOutcome {
    /// Stop propagation and suppress the default behaviour
    Handled,
    /// Let the event continue, e.g. so Tab can move focus out of the tree
    Propagate,
}

impl EventOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, EventOutcome::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(KeyInput::parse("down").unwrap(), KeyInput::new(Key::Down));
        assert_eq!(KeyInput::parse("Home").unwrap(), KeyInput::new(Key::Home));
        assert_eq!(KeyInput::parse("*").unwrap(), KeyInput::new(Key::Asterisk));
        assert_eq!(KeyInput::parse(" ").unwrap(), KeyInput::new(Key::Space));
        assert_eq!(KeyInput::parse("a").unwrap(), KeyInput::char('a'));
        assert_eq!(KeyInput::parse("+").unwrap(), KeyInput::char('+'));
    }

    #[test]
    fn test_parse_chords() {
        assert_eq!(
            KeyInput::parse("shift+tab").unwrap(),
            KeyInput::with_modifiers(Key::Tab, Modifiers::SHIFT)
        );
        let chord = KeyInput::parse("ctrl+alt+x").unwrap();
        assert!(chord.modifiers.ctrl && chord.modifiers.alt && !chord.modifiers.shift);
        assert_eq!(chord.key, Key::Char('x'));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(KeyInput::parse("").is_err());
        assert!(KeyInput::parse("banana").is_err());
    }

    #[test]
    fn test_from_crossterm_event() {
        let back_tab = KeyInput::from(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(back_tab, KeyInput::with_modifiers(Key::Tab, Modifiers::SHIFT));

        let star = KeyInput::from(KeyEvent::new(KeyCode::Char('*'), KeyModifiers::SHIFT));
        assert_eq!(star, KeyInput::new(Key::Asterisk));

        let space = KeyInput::from(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert_eq!(space.key, Key::Space);

        let ctrl_c = KeyInput::from(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(ctrl_c, KeyInput::with_modifiers(Key::Char('c'), Modifiers::CTRL));
    }

    #[test]
    fn test_typed_chars_share_the_key_mapping() {
        assert_eq!(KeyInput::char(' '), KeyInput::new(Key::Space));
        assert_eq!(KeyInput::char('*'), KeyInput::new(Key::Asterisk));
        assert_eq!(KeyInput::char('m'), KeyInput::new(Key::Char('m')));
        assert_eq!(KeyInput::parse("*").unwrap(), KeyInput::char('*'));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for name in ["down", "shift+tab", "ctrl+a", "*", "space", "q"] {
            let input = KeyInput::parse(name).unwrap();
            assert_eq!(KeyInput::parse(&input.to_string()).unwrap(), input);
        }
    }
}
