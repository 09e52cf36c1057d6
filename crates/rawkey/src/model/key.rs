//! Decoded keys and the keypad dialects that produce them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The escape character that introduces terminal key sequences.
pub const ESCAPE: char = '\u{1b}';

/// A decoded logical key.
///
/// Either a single code point typed by the user, or one of the navigation
/// keys a terminal reports as an escape sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// A regular character.
    Char(char),
    /// `ESC [ A` / `ESC O A`.
    ArrowUp,
    /// `ESC [ B` / `ESC O B`.
    ArrowDown,
    /// `ESC [ D` / `ESC O D`.
    ArrowLeft,
    /// `ESC [ C` / `ESC O C`.
    ArrowRight,
    /// `ESC [ H` / `ESC O H`.
    Home,
    /// `ESC [ F` / `ESC O F`.
    End,
    /// `ESC [ 3 ~`.
    Delete,
    /// A standalone Escape keypress.
    Escape,
    /// A well-formed sequence with no mapping. Callers should skip it.
    Ignore,
}

impl Key {
    /// True for keys decoded from an escape sequence (including `Escape` itself).
    pub fn is_special(self) -> bool {
        !matches!(self, Self::Char(_))
    }

    /// The typed character, if this is a regular key.
    pub fn as_char(self) -> Option<char> {
        match self {
            Self::Char(ch) => Some(ch),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(ch) if ch.is_control() => write!(f, "{}", ch.escape_default()),
            Self::Char(ch) => write!(f, "{ch}"),
            Self::ArrowUp => f.write_str("ArrowUp"),
            Self::ArrowDown => f.write_str("ArrowDown"),
            Self::ArrowLeft => f.write_str("ArrowLeft"),
            Self::ArrowRight => f.write_str("ArrowRight"),
            Self::Home => f.write_str("Home"),
            Self::End => f.write_str("End"),
            Self::Delete => f.write_str("Delete"),
            Self::Escape => f.write_str("Escape"),
            Self::Ignore => f.write_str("Ignore"),
        }
    }
}

/// One decoded keystroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    /// The decoded key.
    pub key: Key,
    /// Logical width: one user-perceived keystroke, always 1.
    pub width: usize,
    /// Raw bytes consumed from the input for this key.
    pub len: usize,
}

impl KeyPress {
    pub(crate) fn new(key: Key, len: usize) -> Self {
        Self { key, width: 1, len }
    }
}

/// The dialect announced by the second byte of an escape sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keypad {
    /// `ESC [ ...` (normal cursor keys).
    Normal,
    /// `ESC O ...` (application cursor keys).
    Application,
}

impl Keypad {
    /// Map a keypad prefix character to its dialect.
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            '[' => Some(Self::Normal),
            'O' => Some(Self::Application),
            _ => None,
        }
    }

    /// The prefix character that announces this dialect.
    pub fn prefix(self) -> char {
        match self {
            Self::Normal => '[',
            Self::Application => 'O',
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn keypad_prefixes_map_both_ways() {
        for keypad in [Keypad::Normal, Keypad::Application] {
            assert_eq!(Keypad::from_prefix(keypad.prefix()), Some(keypad));
        }
        assert_eq!(Keypad::from_prefix('X'), None);
        assert_eq!(Keypad::from_prefix('o'), None);
    }

    #[test]
    fn display_escapes_control_characters() {
        assert_eq!(Key::Char('a').to_string(), "a");
        assert_eq!(Key::Char('\r').to_string(), "\\r");
        assert_eq!(Key::Char('\u{3}').to_string(), "\\u{3}");
        assert_eq!(Key::ArrowUp.to_string(), "ArrowUp");
    }

    #[test]
    fn keys_serialize_in_snake_case() {
        let press = KeyPress::new(Key::ArrowLeft, 3);
        let json = serde_json::to_value(press).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"key": "arrow_left", "width": 1, "len": 3})
        );

        let json = serde_json::to_value(Key::Char('x')).unwrap();
        assert_eq!(json, serde_json::json!({"char": "x"}));
    }

    #[test]
    fn only_chars_are_regular() {
        assert!(!Key::Char('a').is_special());
        assert!(Key::Escape.is_special());
        assert_eq!(Key::Char('a').as_char(), Some('a'));
        assert_eq!(Key::Home.as_char(), None);
    }
}
