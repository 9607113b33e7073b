//! Helper functions for event handling

use crate::editor::TextEdit;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn is_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Translate a key press into an editing operation, if it is one
///
/// `Enter` only becomes a newline in multi-line editors; callers decide what
/// it means elsewhere.
pub fn text_edit_for(key: &KeyEvent, multiline: bool) -> Option<TextEdit> {
    match key.code {
        KeyCode::Char('l') if is_ctrl(key) => Some(TextEdit::Clear),
        KeyCode::Char(_) if is_ctrl(key) => None,
        KeyCode::Char(c) => Some(TextEdit::Insert(c)),
        KeyCode::Enter if multiline => Some(TextEdit::Newline),
        KeyCode::Backspace => Some(TextEdit::Backspace),
        KeyCode::Delete => Some(TextEdit::Delete),
        KeyCode::Left => Some(TextEdit::Left),
        KeyCode::Right => Some(TextEdit::Right),
        KeyCode::Home => Some(TextEdit::Home),
        KeyCode::End => Some(TextEdit::End),
        _ => None,
    }
}
