//! Key action model and crossterm event translation.
//!
//! The editor routes `KeyAction` values, never raw crossterm events,
//! so the mode machine and the views stay testable without a terminal.
//! Control chords normalize to uppercase letters (`C-x` and `C-X` are
//! the same action); `C-_` arrives from terminals as unit separator
//! and is kept as `Ctrl('_')`.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// One routed input action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Printable character (no control modifier).
    Char(char),
    /// Control chord; the payload is an uppercase letter or symbol.
    Ctrl(char),
    Esc,
    Enter,
    Tab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
}

/// Map a crossterm event to a key action. Returns `None` for events
/// the editor ignores (releases, focus, mouse, unsupported keys).
pub fn translate(event: &Event) -> Option<KeyAction> {
    match event {
        Event::Key(key) => translate_key(key),
        Event::Resize(cols, rows) => Some(KeyAction::Resize(*cols, *rows)),
        _ => None,
    }
}

fn translate_key(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let action = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            // `C-/` is indistinguishable from `C-_` on VT terminals;
            // normalize both to the help chord.
            let c = if c == '/' { '_' } else { c };
            KeyAction::Ctrl(c.to_ascii_uppercase())
        }
        KeyCode::Char(c) => KeyAction::Char(c),
        KeyCode::Esc => KeyAction::Esc,
        KeyCode::Enter => KeyAction::Enter,
        KeyCode::Tab | KeyCode::BackTab => KeyAction::Tab,
        KeyCode::Backspace => KeyAction::Backspace,
        KeyCode::Delete => KeyAction::Delete,
        KeyCode::Up => KeyAction::Up,
        KeyCode::Down => KeyAction::Down,
        KeyCode::Left => KeyAction::Left,
        KeyCode::Right => KeyAction::Right,
        KeyCode::PageUp => KeyAction::PageUp,
        KeyCode::PageDown => KeyAction::PageDown,
        KeyCode::Home => KeyAction::Home,
        KeyCode::End => KeyAction::End,
        _ => return None,
    };
    Some(action)
}
