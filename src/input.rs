//! Terminal key and pointer events to navigator input.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::nav::{NavDirection, NavInput};

/// Decode a key press. Control/Alt chords are app shortcuts, never navigation.
pub fn nav_input(key: &KeyEvent) -> Option<NavInput> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    let input = match key.code {
        KeyCode::Up => NavInput::Move(NavDirection::Up),
        KeyCode::Down => NavInput::Move(NavDirection::Down),
        KeyCode::Left => NavInput::Move(NavDirection::Left),
        KeyCode::Right => NavInput::Move(NavDirection::Right),
        KeyCode::Home => NavInput::Move(NavDirection::Home),
        KeyCode::End => NavInput::Move(NavDirection::End),
        KeyCode::Enter | KeyCode::Char(' ') => NavInput::Confirm,
        KeyCode::Esc => NavInput::Cancel,
        // Keypad digits arrive as plain chars; shifted symbols stay labels.
        KeyCode::Char(ch) => match ch.to_digit(10) {
            Some(digit @ 1..=9) => NavInput::Digit(digit as u8),
            _ => NavInput::Key(ch.to_string()),
        },
        _ => return None,
    };
    Some(input)
}

/// Shortcuts handled by the shell rather than the active surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    Save,
    Load,
    Quit,
}

pub fn shortcut(key: &KeyEvent) -> Option<Shortcut> {
    if key.kind == KeyEventKind::Release || !key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Char('s') => Some(Shortcut::Save),
        KeyCode::Char('l') => Some(Shortcut::Load),
        KeyCode::Char('c') | KeyCode::Char('q') => Some(Shortcut::Quit),
        _ => None,
    }
}

/// Pointer hover or left press at a cell, as `(column, row)`.
pub fn pointer_position(mouse: &MouseEvent) -> Option<(u16, u16)> {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Down(MouseButton::Left) => {
            Some((mouse.column, mouse.row))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_jumps() {
        assert_eq!(
            nav_input(&press(KeyCode::Up)),
            Some(NavInput::Move(NavDirection::Up))
        );
        assert_eq!(
            nav_input(&press(KeyCode::End)),
            Some(NavInput::Move(NavDirection::End))
        );
    }

    #[test]
    fn confirm_and_cancel() {
        assert_eq!(nav_input(&press(KeyCode::Enter)), Some(NavInput::Confirm));
        assert_eq!(nav_input(&press(KeyCode::Char(' '))), Some(NavInput::Confirm));
        assert_eq!(nav_input(&press(KeyCode::Esc)), Some(NavInput::Cancel));
    }

    #[test]
    fn digits_from_main_row_and_keypad() {
        assert_eq!(nav_input(&press(KeyCode::Char('3'))), Some(NavInput::Digit(3)));

        let keypad = KeyEvent::new_with_kind_and_state(
            KeyCode::Char('9'),
            KeyModifiers::NONE,
            KeyEventKind::Press,
            KeyEventState::KEYPAD,
        );
        assert_eq!(nav_input(&keypad), Some(NavInput::Digit(9)));
    }

    #[test]
    fn zero_and_symbols_are_labels() {
        assert_eq!(
            nav_input(&press(KeyCode::Char('0'))),
            Some(NavInput::Key("0".into()))
        );
        assert_eq!(
            nav_input(&KeyEvent::new(KeyCode::Char('!'), KeyModifiers::SHIFT)),
            Some(NavInput::Key("!".into()))
        );
    }

    #[test]
    fn control_chords_are_shortcuts() {
        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(nav_input(&save), None);
        assert_eq!(shortcut(&save), Some(Shortcut::Save));
        assert_eq!(shortcut(&press(KeyCode::Char('s'))), None);
    }

    #[test]
    fn releases_are_ignored() {
        let release =
            KeyEvent::new_with_kind(KeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(nav_input(&release), None);
    }

    #[test]
    fn pointer_moves_and_presses() {
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 7,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(pointer_position(&mouse), Some((4, 7)));

        let scroll = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            ..mouse
        };
        assert_eq!(pointer_position(&scroll), None);
    }
}
