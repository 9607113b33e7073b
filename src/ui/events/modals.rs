//! Modal dialog handlers
//!
//! This module handles user input for modal dialogs:
//! - Workflow create/edit form
//! - Execute panel
//! - Confirmation of delete/share/hide

use super::helpers::{is_ctrl, text_edit_for};
use crate::actions::AppAction;
use crate::editor::TextEditor;
use crate::form::WorkflowForm;
use crossterm::event::{KeyCode, KeyEvent};

pub fn handle_form_key(form: &WorkflowForm, key: &KeyEvent) -> Option<AppAction> {
    let field = form.focus;

    match key.code {
        KeyCode::Esc => return Some(AppAction::CloseModal),
        KeyCode::Char('s') if is_ctrl(key) => return Some(AppAction::SubmitForm),
        KeyCode::Tab | KeyCode::Down => return Some(AppAction::FocusNext),
        KeyCode::BackTab | KeyCode::Up => return Some(AppAction::FocusPrev),
        _ => {}
    }

    if field.is_choice() {
        return match key.code {
            KeyCode::Left => Some(AppAction::CycleChoice { forward: false }),
            KeyCode::Right | KeyCode::Char(' ') => Some(AppAction::CycleChoice { forward: true }),
            KeyCode::Enter => Some(AppAction::SubmitForm),
            _ => None,
        };
    }

    let multiline = form.editor(field).is_some_and(TextEditor::is_multiline);
    if key.code == KeyCode::Enter && !multiline {
        return Some(AppAction::SubmitForm);
    }

    text_edit_for(key, multiline).map(AppAction::Edit)
}

pub fn handle_execute_key(key: &KeyEvent) -> Option<AppAction> {
    if is_ctrl(key) {
        return match key.code {
            KeyCode::Char('e') => Some(AppAction::Execute),
            KeyCode::Char('f') => Some(AppAction::ReformatParameters),
            KeyCode::Char('r') => Some(AppAction::ResetParameters),
            KeyCode::Char('t') => Some(AppAction::CopyRequest),
            KeyCode::Char('y') => Some(AppAction::CopyResponse),
            KeyCode::Char('c') => Some(AppAction::CloseModal),
            KeyCode::Char('l') => text_edit_for(key, true).map(AppAction::Edit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => Some(AppAction::CloseModal),
        KeyCode::PageDown => Some(AppAction::ScrollResultDown),
        KeyCode::PageUp => Some(AppAction::ScrollResultUp),
        _ => text_edit_for(key, true).map(AppAction::Edit),
    }
}

pub fn handle_confirm_key(key: &KeyEvent) -> Option<AppAction> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(AppAction::ConfirmPending),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(AppAction::CloseModal),
        _ => None,
    }
}
