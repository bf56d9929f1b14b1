//! Fixed mapping from keyboard identifiers to keypad keys.
//!
//! Identifiers follow the browser `KeyboardEvent.key` names so the same
//! bindings work for any front end that produces them.

use crossterm::event::KeyCode;
use service_protos::Key;

/// Keys forwarded to the store. Anything not listed is ignored.
pub const KEY_BINDINGS: &[(&str, Key)] = &[
    ("1", Key::L1),
    ("2", Key::L2),
    ("3", Key::L3),
    ("Backspace", Key::Home),
    ("ArrowLeft", Key::Back),
    ("h", Key::Back),
    ("ArrowUp", Key::Up),
    ("k", Key::Up),
    ("ArrowDown", Key::Down),
    ("j", Key::Down),
];

/// Keypad key bound to `identifier`, if any
pub fn lookup(identifier: &str) -> Option<Key> {
    KEY_BINDINGS
        .iter()
        .find(|(name, _)| *name == identifier)
        .map(|(_, key)| *key)
}

/// Identifier for a terminal key code, `None` for keys with no name
pub fn identifier(code: KeyCode) -> Option<String> {
    match code {
        KeyCode::Left => Some("ArrowLeft".to_string()),
        KeyCode::Right => Some("ArrowRight".to_string()),
        KeyCode::Up => Some("ArrowUp".to_string()),
        KeyCode::Down => Some("ArrowDown".to_string()),
        KeyCode::Backspace => Some("Backspace".to_string()),
        KeyCode::Enter => Some("Enter".to_string()),
        KeyCode::Esc => Some("Escape".to_string()),
        KeyCode::Char(c) => Some(c.to_string()),
        _ => None,
    }
}
