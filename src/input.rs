//! Key and mouse bindings: arrows or vim keys for the cursor, left click for tiles.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Action from a key press or mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Left click at a terminal cell (column, row).
    Click { column: u16, row: u16 },
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    /// Click the tile under the keyboard cursor.
    Select,
    Restart,
    Quit,
    None,
}

/// Map key event to action. Supports both normal (arrows, enter) and vim (hjkl) keys.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Up | KeyCode::Char('k') => Action::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Action::CursorDown,
        KeyCode::Left | KeyCode::Char('h') => Action::CursorLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::CursorRight,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        _ => Action::None,
    }
}

/// Only a left button press counts as a click.
pub fn mouse_to_action(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Action::Click {
            column: mouse.column,
            row: mouse.row,
        },
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 12,
            row: 4,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_cursor_keys() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::CursorLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('l'))), Action::CursorRight);
        assert_eq!(key_to_action(key(KeyCode::Char('k'))), Action::CursorUp);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::CursorDown);
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Select);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('h'), KeyModifiers::ALT)),
            Action::None
        );
    }

    #[test]
    fn test_left_press_is_click() {
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::Down(MouseButton::Left))),
            Action::Click { column: 12, row: 4 }
        );
        assert_eq!(mouse_to_action(mouse(MouseEventKind::Down(MouseButton::Right))), Action::None);
        assert_eq!(mouse_to_action(mouse(MouseEventKind::Up(MouseButton::Left))), Action::None);
        assert_eq!(mouse_to_action(mouse(MouseEventKind::Moved)), Action::None);
    }
}
