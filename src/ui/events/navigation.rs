//! Navigation handlers
//!
//! Keys for the main view: moving through the workflow list, switching
//! projects and opening the per-workflow actions. Admin-only keys map to
//! nothing for members.

use super::helpers::is_ctrl;
use crate::actions::AppAction;
use crate::state::AppState;
use crossterm::event::{KeyCode, KeyEvent};

pub fn handle_main_key(state: &AppState, key: &KeyEvent) -> Option<AppAction> {
    let action = match key.code {
        KeyCode::Char('q') => AppAction::Quit,
        KeyCode::Char('c') if is_ctrl(key) => AppAction::Quit,

        KeyCode::Char('j') | KeyCode::Down => AppAction::SelectNext,
        KeyCode::Char('k') | KeyCode::Up => AppAction::SelectPrev,
        KeyCode::Tab | KeyCode::Char(']') => AppAction::NextProject,
        KeyCode::BackTab | KeyCode::Char('[') => AppAction::PrevProject,
        KeyCode::Char('r') | KeyCode::F(5) => AppAction::RefreshWorkflows,
        KeyCode::Esc => AppAction::DismissBanner,

        KeyCode::Enter | KeyCode::Char('x') => AppAction::OpenExecute,

        KeyCode::Char('n') if state.can_manage() => AppAction::OpenCreateForm,
        KeyCode::Char('e') if state.can_manage() => AppAction::OpenEditForm,
        KeyCode::Char('d') if state.can_manage() => AppAction::RequestDelete,
        KeyCode::Char('s') if state.can_manage() => AppAction::RequestToggleShare,
        KeyCode::Char('h') if state.can_manage() => AppAction::RequestToggleHide,

        _ => return None,
    };
    Some(action)
}
