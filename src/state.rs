use crate::form::WorkflowForm;
use crate::relay::ExecutionPanel;
use crate::session::SessionStatus;
use crate::types::{LoadingState, Project, Role, Workflow};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Error,
}

/// Dismissible message shown above the workflow list
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }
}

/// Admin mutation waiting for confirmation, or in flight once confirmed
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Delete {
        workflow_id: String,
        name: String,
    },
    Share {
        workflow_id: String,
        name: String,
        shared: bool,
    },
    Hide {
        project_id: String,
        workflow_id: String,
        name: String,
        hidden: bool,
    },
}

impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::Delete { name, .. } => {
                format!("Delete workflow \"{name}\"? This cannot be undone.")
            }
            PendingAction::Share { name, shared, .. } => {
                if *shared {
                    format!("Share workflow \"{name}\"?")
                } else {
                    format!("Stop sharing workflow \"{name}\"?")
                }
            }
            PendingAction::Hide { name, hidden, .. } => {
                if *hidden {
                    format!("Hide workflow \"{name}\"?")
                } else {
                    format!("Unhide workflow \"{name}\"?")
                }
            }
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            PendingAction::Delete { .. } => "Workflow deleted",
            PendingAction::Share { shared: true, .. } => "Workflow shared",
            PendingAction::Share { shared: false, .. } => "Workflow unshared",
            PendingAction::Hide { hidden: true, .. } => "Workflow hidden",
            PendingAction::Hide { hidden: false, .. } => "Workflow unhidden",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            PendingAction::Delete { .. } => "Failed to delete workflow",
            PendingAction::Share { .. } => "Failed to update sharing",
            PendingAction::Hide { .. } => "Failed to update visibility",
        }
    }
}

/// Which overlay is open on top of the main view
#[derive(Debug, Clone, Default)]
pub enum Modal {
    #[default]
    None,
    Form(WorkflowForm),
    Execute(ExecutionPanel),
    Confirm(PendingAction),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub auth: SessionStatus,
    /// Launch URL with the token scrubbed
    pub location: Option<String>,

    pub projects: Vec<Project>,
    pub projects_state: LoadingState,
    pub selected_project: Option<usize>,

    pub workflows: Vec<Workflow>,
    pub loading_state: LoadingState,
    pub selected_index: usize,

    pub banner: Option<Banner>,
    pub modal: Modal,
    /// Id handed to the next execution; ids are never reused
    pub next_run_id: u64,

    /// Set once the hand-off to the login surface has been scheduled
    pub redirect_notice: Option<String>,
    pub login_url: String,
    pub redirect_grace: Duration,

    pub should_quit: bool,
    /// Printed after the terminal is restored
    pub exit_message: Option<String>,
}

impl AppState {
    pub fn new(auth: SessionStatus, login_url: impl Into<String>, redirect_grace: Duration) -> Self {
        Self {
            auth,
            location: None,
            projects: Vec::new(),
            projects_state: LoadingState::Idle,
            selected_project: None,
            workflows: Vec::new(),
            loading_state: LoadingState::Idle,
            selected_index: 0,
            banner: None,
            modal: Modal::None,
            next_run_id: 1,
            redirect_notice: None,
            login_url: login_url.into(),
            redirect_grace,
            should_quit: false,
            exit_message: None,
        }
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.selected_project.and_then(|i| self.projects.get(i))
    }

    /// Role in the selected project; no project means no privileges
    pub fn role(&self) -> Role {
        self.current_project()
            .map(|p| p.role)
            .unwrap_or(Role::Member)
    }

    pub fn can_manage(&self) -> bool {
        self.role().can_manage()
    }

    pub fn selected_workflow(&self) -> Option<&Workflow> {
        self.workflows.get(self.selected_index)
    }

    #[cfg(test)]
    pub fn has_modal(&self) -> bool {
        !matches!(self.modal, Modal::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, role: Role) -> Project {
        Project {
            project_id: id.to_string(),
            project_name: id.to_uppercase(),
            role,
        }
    }

    #[test]
    fn test_role_is_per_project() {
        let mut state = AppState::new(SessionStatus::Authenticated, "", Duration::ZERO);
        state.projects = vec![project("a", Role::Admin), project("b", Role::Member)];

        assert!(!state.can_manage());
        state.selected_project = Some(0);
        assert!(state.can_manage());
        state.selected_project = Some(1);
        assert!(!state.can_manage());
    }

    #[test]
    fn test_pending_action_messages() {
        let share = PendingAction::Share {
            workflow_id: "wf-1".to_string(),
            name: "Echo".to_string(),
            shared: false,
        };
        assert_eq!(share.prompt(), "Stop sharing workflow \"Echo\"?");
        assert_eq!(share.success_message(), "Workflow unshared");
    }
}
