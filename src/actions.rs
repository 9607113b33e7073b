use crate::api::ApiError;
use crate::editor::TextEdit;
use crate::form::{FormMode, WorkflowForm};
use crate::relay::ExecutionPanel;
use crate::session::SessionStatus;
use crate::state::{AppState, Banner, Modal, PendingAction};
use crate::types::{
    cycle, ExecutionRequest, ExecutionResult, LoadingState, Project, Workflow, WorkflowPayload,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Everything that can change the application state
///
/// Key presses are mapped to actions in `ui::events`; background tasks report
/// their outcome as actions too, so all state changes go through [`dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// First action after the terminal is up
    Start,

    // Projects and the workflow list
    ProjectsLoaded(Result<Vec<Project>, ApiError>),
    NextProject,
    PrevProject,
    RefreshWorkflows,
    WorkflowsLoaded {
        project_id: String,
        result: Result<Vec<Workflow>, ApiError>,
    },
    SelectNext,
    SelectPrev,
    DismissBanner,

    // Create/edit form
    OpenCreateForm,
    OpenEditForm,
    /// Text edit routed to whichever modal has a focused editor
    Edit(TextEdit),
    FocusNext,
    FocusPrev,
    CycleChoice {
        forward: bool,
    },
    SubmitForm,
    FormSaved(Result<(), ApiError>),

    // Execution
    OpenExecute,
    Execute,
    ExecutionFinished {
        workflow_id: String,
        run_id: u64,
        result: Result<ExecutionResult, ApiError>,
    },
    ReformatParameters,
    ResetParameters,
    ScrollResultUp,
    ScrollResultDown,
    CopyRequest,
    CopyResponse,

    // Admin card actions
    RequestDelete,
    RequestToggleShare,
    RequestToggleHide,
    ConfirmPending,
    MutationFinished {
        action: PendingAction,
        result: Result<(), ApiError>,
    },

    /// Grace delay before the login hand-off has elapsed
    RedirectDue,
    CloseModal,
    Quit,
}

/// Side effect requested by [`dispatch`], performed by `effects`
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadProjects,
    LoadWorkflows {
        project_id: String,
    },
    SaveWorkflow {
        mode: FormMode,
        payload: WorkflowPayload,
    },
    ExecuteWorkflow {
        workflow_id: String,
        run_id: u64,
        request: ExecutionRequest,
    },
    Mutate(PendingAction),
    RedirectToLogin {
        delay: Duration,
    },
    CopyToClipboard(String),
}

/// Apply an action to the state and return the side effects it requires
pub fn dispatch(action: AppAction, state: &mut AppState) -> Vec<Command> {
    if is_unauthorized(&action) {
        return begin_redirect(state, "Your session has expired.");
    }

    match action {
        AppAction::Start => {
            if state.auth == SessionStatus::NoToken {
                return begin_redirect(state, "No session token found.");
            }
            state.projects_state = LoadingState::Fetching;
            vec![Command::LoadProjects]
        }

        AppAction::ProjectsLoaded(result) => {
            state.projects_state = LoadingState::Complete;
            match result {
                Ok(projects) => {
                    info!("loaded {} projects", projects.len());
                    state.projects = projects;
                    if state.projects.is_empty() {
                        state.selected_project = None;
                        state.banner = Some(Banner::info("You are not a member of any project"));
                        return vec![];
                    }
                    select_project(state, 0)
                }
                Err(e) => {
                    state.banner = Some(Banner::error(e.user_message("Failed to load projects")));
                    vec![]
                }
            }
        }

        AppAction::NextProject | AppAction::PrevProject => {
            let Some(current) = state.selected_project else {
                return vec![];
            };
            if state.projects.len() < 2 {
                return vec![];
            }
            let indices: Vec<usize> = (0..state.projects.len()).collect();
            let next = cycle(&indices, current, action == AppAction::NextProject);
            select_project(state, next)
        }

        AppAction::RefreshWorkflows => match state.current_project() {
            Some(project) => {
                let project_id = project.project_id.clone();
                state.loading_state = LoadingState::Fetching;
                vec![Command::LoadWorkflows { project_id }]
            }
            None => vec![],
        },

        AppAction::WorkflowsLoaded { project_id, result } => {
            let selected = state.current_project().map(|p| p.project_id.as_str());
            if selected != Some(project_id.as_str()) {
                debug!("discarding workflow list for unselected project {}", project_id);
                return vec![];
            }

            state.loading_state = LoadingState::Complete;
            match result {
                Ok(workflows) => {
                    state.workflows = workflows;
                    let last = state.workflows.len().saturating_sub(1);
                    state.selected_index = state.selected_index.min(last);
                }
                Err(e) => {
                    state.banner =
                        Some(Banner::error(e.user_message("Failed to load workflows")));
                }
            }
            vec![]
        }

        AppAction::SelectNext => {
            if state.selected_index + 1 < state.workflows.len() {
                state.selected_index += 1;
            }
            vec![]
        }

        AppAction::SelectPrev => {
            state.selected_index = state.selected_index.saturating_sub(1);
            vec![]
        }

        AppAction::DismissBanner => {
            state.banner = None;
            vec![]
        }

        AppAction::OpenCreateForm => {
            if !state.can_manage() {
                debug!("create ignored: not an admin of the selected project");
                return vec![];
            }
            if let Some(project) = state.current_project() {
                state.modal = Modal::Form(WorkflowForm::create(&project.project_id));
            }
            vec![]
        }

        AppAction::OpenEditForm => {
            if !state.can_manage() {
                debug!("edit ignored: not an admin of the selected project");
                return vec![];
            }
            if let Some(workflow) = state.selected_workflow() {
                state.modal = Modal::Form(WorkflowForm::edit(workflow));
            }
            vec![]
        }

        AppAction::Edit(edit) => {
            match &mut state.modal {
                Modal::Form(form) if !form.saving => form.apply_edit(edit),
                Modal::Execute(panel) => panel.edit_parameters(edit),
                _ => {}
            }
            vec![]
        }

        AppAction::FocusNext | AppAction::FocusPrev => {
            if let Modal::Form(form) = &mut state.modal {
                if action == AppAction::FocusNext {
                    form.focus_next();
                } else {
                    form.focus_prev();
                }
            }
            vec![]
        }

        AppAction::CycleChoice { forward } => {
            if let Modal::Form(form) = &mut state.modal {
                if !form.saving {
                    form.cycle_choice(forward);
                }
            }
            vec![]
        }

        AppAction::SubmitForm => {
            let Modal::Form(form) = &mut state.modal else {
                return vec![];
            };
            if form.saving {
                return vec![];
            }
            match form.submit() {
                Ok((mode, payload)) => vec![Command::SaveWorkflow { mode, payload }],
                Err(errors) => {
                    debug!("form blocked: {}", errors);
                    vec![]
                }
            }
        }

        AppAction::FormSaved(result) => {
            let form_open = matches!(state.modal, Modal::Form(ref f) if f.saving);
            match result {
                Ok(()) => {
                    let created = match &state.modal {
                        Modal::Form(form) if form_open => !form.is_edit(),
                        _ => false,
                    };
                    if form_open {
                        state.modal = Modal::None;
                    }
                    state.banner = Some(Banner::info(if created {
                        "Workflow created"
                    } else {
                        "Workflow saved"
                    }));
                    dispatch(AppAction::RefreshWorkflows, state)
                }
                Err(e) => {
                    let message = e.user_message("Failed to save workflow");
                    match &mut state.modal {
                        Modal::Form(form) if form_open => {
                            form.saving = false;
                            form.submit_error = Some(message);
                        }
                        _ => state.banner = Some(Banner::error(message)),
                    }
                    vec![]
                }
            }
        }

        AppAction::OpenExecute => {
            if let Some(workflow) = state.selected_workflow() {
                state.modal = Modal::Execute(ExecutionPanel::new(workflow.clone()));
            }
            vec![]
        }

        AppAction::Execute => {
            let Modal::Execute(panel) = &mut state.modal else {
                return vec![];
            };
            let run_id = state.next_run_id;
            match panel.begin(run_id) {
                Ok(request) => {
                    state.next_run_id += 1;
                    vec![Command::ExecuteWorkflow {
                        workflow_id: panel.workflow.workflow_id.clone(),
                        run_id,
                        request,
                    }]
                }
                Err(e) => {
                    debug!("execution not started: {}", e);
                    vec![]
                }
            }
        }

        AppAction::ExecutionFinished {
            workflow_id,
            run_id,
            result,
        } => {
            let applied = match &mut state.modal {
                Modal::Execute(panel) => panel.finish(run_id, result),
                _ => false,
            };
            if !applied {
                debug!("stale result of run {} for {} dropped", run_id, workflow_id);
            }
            vec![]
        }

        AppAction::ReformatParameters => {
            if let Modal::Execute(panel) = &mut state.modal {
                panel.reformat();
            }
            vec![]
        }

        AppAction::ResetParameters => {
            if let Modal::Execute(panel) = &mut state.modal {
                panel.reset();
            }
            vec![]
        }

        AppAction::ScrollResultUp | AppAction::ScrollResultDown => {
            if let Modal::Execute(panel) = &mut state.modal {
                if action == AppAction::ScrollResultDown {
                    panel.scroll_down();
                } else {
                    panel.scroll_up();
                }
            }
            vec![]
        }

        AppAction::CopyRequest | AppAction::CopyResponse => {
            let Modal::Execute(panel) = &state.modal else {
                return vec![];
            };
            let text = if action == AppAction::CopyRequest {
                panel.request_text()
            } else {
                panel.response_text()
            };
            text.map(Command::CopyToClipboard).into_iter().collect()
        }

        AppAction::RequestDelete | AppAction::RequestToggleShare | AppAction::RequestToggleHide => {
            if !state.can_manage() {
                debug!("{:?} ignored: not an admin of the selected project", action);
                return vec![];
            }
            let Some(workflow) = state.selected_workflow() else {
                return vec![];
            };
            let workflow_id = workflow.workflow_id.clone();
            let name = workflow.workflow_name.clone();
            let pending = match action {
                AppAction::RequestDelete => PendingAction::Delete { workflow_id, name },
                AppAction::RequestToggleShare => PendingAction::Share {
                    workflow_id,
                    name,
                    shared: !workflow.is_shared,
                },
                _ => PendingAction::Hide {
                    project_id: workflow.project_id.clone(),
                    workflow_id,
                    name,
                    hidden: !workflow.is_hidden,
                },
            };
            state.modal = Modal::Confirm(pending);
            vec![]
        }

        AppAction::ConfirmPending => {
            if !matches!(state.modal, Modal::Confirm(_)) {
                return vec![];
            }
            let Modal::Confirm(pending) = std::mem::take(&mut state.modal) else {
                return vec![];
            };
            if !state.can_manage() {
                warn!("confirmed action dropped: role no longer permits it");
                return vec![];
            }
            vec![Command::Mutate(pending)]
        }

        AppAction::MutationFinished { action, result } => match result {
            Ok(()) => {
                state.banner = Some(Banner::info(action.success_message()));
                dispatch(AppAction::RefreshWorkflows, state)
            }
            Err(e) => {
                state.banner = Some(Banner::error(e.user_message(action.failure_message())));
                vec![]
            }
        },

        AppAction::RedirectDue => {
            state.should_quit = true;
            state.exit_message = Some(format!(
                "Please sign in to continue: {}\n(the login URL has been copied to the clipboard)",
                state.login_url
            ));
            vec![Command::CopyToClipboard(state.login_url.clone())]
        }

        AppAction::CloseModal => {
            state.modal = Modal::None;
            vec![]
        }

        AppAction::Quit => {
            state.should_quit = true;
            vec![]
        }
    }
}

fn select_project(state: &mut AppState, index: usize) -> Vec<Command> {
    state.selected_project = Some(index);
    state.workflows.clear();
    state.selected_index = 0;
    state.modal = Modal::None;
    dispatch(AppAction::RefreshWorkflows, state)
}

fn is_unauthorized(action: &AppAction) -> bool {
    let unauthorized = |e: &ApiError| matches!(e, ApiError::Unauthorized);
    match action {
        AppAction::ProjectsLoaded(Err(e))
        | AppAction::WorkflowsLoaded { result: Err(e), .. }
        | AppAction::FormSaved(Err(e))
        | AppAction::ExecutionFinished { result: Err(e), .. }
        | AppAction::MutationFinished { result: Err(e), .. } => unauthorized(e),
        _ => false,
    }
}

/// Schedule the login hand-off; only the first call does anything
fn begin_redirect(state: &mut AppState, reason: &str) -> Vec<Command> {
    if state.redirect_notice.is_some() {
        debug!("login hand-off already scheduled");
        return vec![];
    }

    info!("handing off to login surface: {}", reason);
    state.auth = SessionStatus::NoToken;
    state.modal = Modal::None;
    state.loading_state = LoadingState::Idle;
    state.redirect_notice = Some(format!(
        "{} Redirecting to login in {}s...",
        reason,
        state.redirect_grace.as_secs()
    ));
    vec![Command::RedirectToLogin {
        delay: state.redirect_grace,
    }]
}
