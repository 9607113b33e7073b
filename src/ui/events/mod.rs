//! Event handling system for workflow-console
//!
//! This module translates terminal input into [`AppAction`]s. It never
//! mutates state itself: the runtime feeds the returned action to
//! `actions::dispatch`. Input is routed by what is on screen:
//! - the login hand-off notice (only quitting is possible)
//! - the create/edit form
//! - the execute panel
//! - a confirmation prompt
//! - otherwise the main workflow list

mod helpers;
mod modals;
mod navigation;

use crate::actions::AppAction;
use crate::editor::TextEdit;
use crate::state::{AppState, Modal};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

/// Map a terminal event to an action, or nothing
pub fn map_event(state: &AppState, event: Event) -> Option<AppAction> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(state, &key),
        Event::Paste(text) => map_paste(state, text),
        _ => None,
    }
}

pub fn map_key(state: &AppState, key: &KeyEvent) -> Option<AppAction> {
    if state.redirect_notice.is_some() {
        return match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(AppAction::Quit),
            _ => None,
        };
    }

    match &state.modal {
        Modal::Form(form) => modals::handle_form_key(form, key),
        Modal::Execute(_) => modals::handle_execute_key(key),
        Modal::Confirm(_) => modals::handle_confirm_key(key),
        Modal::None => navigation::handle_main_key(state, key),
    }
}

/// Bracketed paste goes to whichever editor is open
pub fn map_paste(state: &AppState, text: String) -> Option<AppAction> {
    match &state.modal {
        Modal::Form(form) if !form.focus.is_choice() => Some(AppAction::Edit(TextEdit::Paste(text))),
        Modal::Execute(_) => Some(AppAction::Edit(TextEdit::Paste(text))),
        _ => None,
    }
}
