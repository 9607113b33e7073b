//! Runs the [`Command`]s returned by `dispatch` as background tasks
//!
//! Each task reports back through the action channel; nothing here touches
//! `AppState` directly.

use crate::actions::{AppAction, Command};
use crate::api::{ApiError, LoginApi, WorkflowApi};
use crate::form::FormMode;
use crate::state::PendingAction;
use crate::types::{ExecutionRequest, ExecutionResult, Project, Workflow, WorkflowPayload};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// The two backends as seen by the console
#[async_trait]
pub trait ConsoleBackend: Send + Sync {
    async fn projects(&self) -> Result<Vec<Project>, ApiError>;
    async fn list_workflows(&self, project_id: &str) -> Result<Vec<Workflow>, ApiError>;
    async fn create_workflow(&self, payload: &WorkflowPayload) -> Result<(), ApiError>;
    async fn update_workflow(
        &self,
        workflow_id: &str,
        payload: &WorkflowPayload,
    ) -> Result<(), ApiError>;
    async fn delete_workflow(&self, workflow_id: &str) -> Result<(), ApiError>;
    async fn execute_workflow(
        &self,
        workflow_id: &str,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResult, ApiError>;
    async fn share_workflow(&self, workflow_id: &str, is_shared: bool) -> Result<(), ApiError>;
    async fn hide_workflow(
        &self,
        project_id: &str,
        workflow_id: &str,
        is_hidden: bool,
    ) -> Result<(), ApiError>;
}

/// Production backend over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    login: LoginApi,
    workflows: WorkflowApi,
}

impl HttpBackend {
    pub fn new(login: LoginApi, workflows: WorkflowApi) -> Self {
        Self { login, workflows }
    }
}

#[async_trait]
impl ConsoleBackend for HttpBackend {
    async fn projects(&self) -> Result<Vec<Project>, ApiError> {
        self.login.projects().await
    }

    async fn list_workflows(&self, project_id: &str) -> Result<Vec<Workflow>, ApiError> {
        self.workflows.list(project_id).await
    }

    async fn create_workflow(&self, payload: &WorkflowPayload) -> Result<(), ApiError> {
        self.workflows.create(payload).await
    }

    async fn update_workflow(
        &self,
        workflow_id: &str,
        payload: &WorkflowPayload,
    ) -> Result<(), ApiError> {
        self.workflows.update(workflow_id, payload).await
    }

    async fn delete_workflow(&self, workflow_id: &str) -> Result<(), ApiError> {
        self.workflows.delete(workflow_id).await
    }

    async fn execute_workflow(
        &self,
        workflow_id: &str,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResult, ApiError> {
        self.workflows.execute(workflow_id, request).await
    }

    async fn share_workflow(&self, workflow_id: &str, is_shared: bool) -> Result<(), ApiError> {
        self.workflows.share(workflow_id, is_shared).await
    }

    async fn hide_workflow(
        &self,
        project_id: &str,
        workflow_id: &str,
        is_hidden: bool,
    ) -> Result<(), ApiError> {
        self.workflows.hide(project_id, workflow_id, is_hidden).await
    }
}

/// Perform one command and return the action reporting its outcome
///
/// `CopyToClipboard` needs the terminal thread and is handled by `App`;
/// it yields nothing here.
pub async fn run_command(backend: &dyn ConsoleBackend, command: Command) -> Option<AppAction> {
    debug!("running {}", command_name(&command));
    match command {
        Command::LoadProjects => Some(AppAction::ProjectsLoaded(backend.projects().await)),

        Command::LoadWorkflows { project_id } => {
            let result = backend.list_workflows(&project_id).await;
            Some(AppAction::WorkflowsLoaded { project_id, result })
        }

        Command::SaveWorkflow { mode, payload } => {
            let result = match &mode {
                FormMode::Create => backend.create_workflow(&payload).await,
                FormMode::Edit(workflow_id) => backend.update_workflow(workflow_id, &payload).await,
            };
            Some(AppAction::FormSaved(result))
        }

        Command::ExecuteWorkflow {
            workflow_id,
            run_id,
            request,
        } => {
            let result = backend.execute_workflow(&workflow_id, &request).await;
            if let Err(e) = &result {
                warn!("execution {} of {} failed: {}", run_id, workflow_id, e);
            }
            Some(AppAction::ExecutionFinished {
                workflow_id,
                run_id,
                result,
            })
        }

        Command::Mutate(action) => {
            let result = match &action {
                PendingAction::Delete { workflow_id, .. } => {
                    backend.delete_workflow(workflow_id).await
                }
                PendingAction::Share {
                    workflow_id,
                    shared,
                    ..
                } => backend.share_workflow(workflow_id, *shared).await,
                PendingAction::Hide {
                    project_id,
                    workflow_id,
                    hidden,
                    ..
                } => backend.hide_workflow(project_id, workflow_id, *hidden).await,
            };
            Some(AppAction::MutationFinished { action, result })
        }

        Command::RedirectToLogin { delay } => {
            tokio::time::sleep(delay).await;
            Some(AppAction::RedirectDue)
        }

        Command::CopyToClipboard(_) => None,
    }
}

/// Run a command on the tokio runtime, sending its outcome to `tx`
pub fn spawn_command(
    backend: Arc<dyn ConsoleBackend>,
    command: Command,
    tx: UnboundedSender<AppAction>,
) {
    tokio::spawn(async move {
        if let Some(action) = run_command(backend.as_ref(), command).await {
            // receiver gone means the app is shutting down
            let _ = tx.send(action);
        }
    });
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::LoadProjects => "load projects",
        Command::LoadWorkflows { .. } => "load workflows",
        Command::SaveWorkflow { .. } => "save workflow",
        Command::ExecuteWorkflow { .. } => "execute workflow",
        Command::Mutate(_) => "mutate workflow",
        Command::RedirectToLogin { .. } => "redirect to login",
        Command::CopyToClipboard(_) => "copy to clipboard",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::dispatch;
    use crate::api::ApiClient;
    use crate::session::{FileTokenStore, Session, SessionStatus, TokenStore};
    use crate::state::AppState;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records calls and answers from canned results
    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<String>>,
        fail_with: Option<ApiError>,
    }

    impl FakeBackend {
        fn record(&self, call: String) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConsoleBackend for FakeBackend {
        async fn projects(&self) -> Result<Vec<Project>, ApiError> {
            self.record("projects".to_string())?;
            Ok(vec![])
        }

        async fn list_workflows(&self, project_id: &str) -> Result<Vec<Workflow>, ApiError> {
            self.record(format!("list {project_id}"))?;
            Ok(vec![])
        }

        async fn create_workflow(&self, payload: &WorkflowPayload) -> Result<(), ApiError> {
            self.record(format!("create {}", payload.workflow_name))
        }

        async fn update_workflow(
            &self,
            workflow_id: &str,
            _payload: &WorkflowPayload,
        ) -> Result<(), ApiError> {
            self.record(format!("update {workflow_id}"))
        }

        async fn delete_workflow(&self, workflow_id: &str) -> Result<(), ApiError> {
            self.record(format!("delete {workflow_id}"))
        }

        async fn execute_workflow(
            &self,
            workflow_id: &str,
            _request: &ExecutionRequest,
        ) -> Result<ExecutionResult, ApiError> {
            self.record(format!("execute {workflow_id}"))?;
            Ok(ExecutionResult::default())
        }

        async fn share_workflow(&self, workflow_id: &str, is_shared: bool) -> Result<(), ApiError> {
            self.record(format!("share {workflow_id} {is_shared}"))
        }

        async fn hide_workflow(
            &self,
            project_id: &str,
            workflow_id: &str,
            is_hidden: bool,
        ) -> Result<(), ApiError> {
            self.record(format!("hide {project_id}/{workflow_id} {is_hidden}"))
        }
    }

    fn payload() -> WorkflowPayload {
        WorkflowPayload {
            workflow_name: "Echo".to_string(),
            description: "d".to_string(),
            source: Default::default(),
            template_name: Default::default(),
            http_method: Default::default(),
            base_url: "https://example.com".to_string(),
            bearer_token: "t".to_string(),
            external_workflow_id: "1".to_string(),
            parameters: serde_json::json!({}),
            headers: serde_json::json!({}),
            project_id: "p-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_routes_on_form_mode() {
        let backend = FakeBackend::default();

        run_command(
            &backend,
            Command::SaveWorkflow {
                mode: FormMode::Create,
                payload: payload(),
            },
        )
        .await;
        let action = run_command(
            &backend,
            Command::SaveWorkflow {
                mode: FormMode::Edit("wf-1".to_string()),
                payload: payload(),
            },
        )
        .await;

        assert_eq!(action, Some(AppAction::FormSaved(Ok(()))));
        assert_eq!(backend.calls(), vec!["create Echo", "update wf-1"]);
    }

    #[tokio::test]
    async fn test_mutations_map_to_calls() {
        let backend = FakeBackend::default();
        let hide = PendingAction::Hide {
            project_id: "p-1".to_string(),
            workflow_id: "wf-1".to_string(),
            name: "Echo".to_string(),
            hidden: true,
        };

        let action = run_command(&backend, Command::Mutate(hide.clone())).await;
        run_command(
            &backend,
            Command::Mutate(PendingAction::Share {
                workflow_id: "wf-1".to_string(),
                name: "Echo".to_string(),
                shared: false,
            }),
        )
        .await;
        run_command(
            &backend,
            Command::Mutate(PendingAction::Delete {
                workflow_id: "wf-1".to_string(),
                name: "Echo".to_string(),
            }),
        )
        .await;

        assert_eq!(
            action,
            Some(AppAction::MutationFinished {
                action: hide,
                result: Ok(())
            })
        );
        assert_eq!(
            backend.calls(),
            vec!["hide p-1/wf-1 true", "share wf-1 false", "delete wf-1"]
        );
    }

    #[tokio::test]
    async fn test_failures_are_reported_as_actions() {
        let backend = FakeBackend {
            fail_with: Some(ApiError::Transport("Request failed: refused".to_string())),
            ..Default::default()
        };

        let action = run_command(
            &backend,
            Command::LoadWorkflows {
                project_id: "p-1".to_string(),
            },
        )
        .await;
        assert_eq!(
            action,
            Some(AppAction::WorkflowsLoaded {
                project_id: "p-1".to_string(),
                result: Err(ApiError::Transport("Request failed: refused".to_string())),
            })
        );
    }

    #[tokio::test]
    async fn test_redirect_and_clipboard() {
        let backend = FakeBackend::default();
        let due = run_command(
            &backend,
            Command::RedirectToLogin {
                delay: Duration::ZERO,
            },
        )
        .await;
        assert_eq!(due, Some(AppAction::RedirectDue));

        let copy = run_command(&backend, Command::CopyToClipboard("x".to_string())).await;
        assert!(copy.is_none());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_spawned_command_reports_back() {
        let backend: Arc<dyn ConsoleBackend> = Arc::new(FakeBackend::default());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        spawn_command(backend, Command::LoadProjects, tx);

        assert_eq!(rx.recv().await, Some(AppAction::ProjectsLoaded(Ok(vec![]))));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_token_and_redirects_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/projects/p-1/workflows")
            .with_status(401)
            .with_body(r#"{"success": false, "error": "Invalid token"}"#)
            .expect(2)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.save("stale").unwrap();
        let session = Session::new(FileTokenStore::new(dir.path().to_path_buf()));
        session.bootstrap(None).unwrap();

        let client = ApiClient::new(&server.url(), Duration::from_secs(5), session.clone()).unwrap();
        let backend = HttpBackend::new(
            LoginApi::new(client.clone()),
            WorkflowApi::new(client),
        );

        let mut state = AppState::new(SessionStatus::Authenticated, "http://login", Duration::ZERO);
        let load = Command::LoadWorkflows {
            project_id: "p-1".to_string(),
        };

        // two list requests were in flight when the token was rejected
        let mut redirects = 0;
        for _ in 0..2 {
            if let Some(action) = run_command(&backend, load.clone()).await {
                redirects += dispatch(action, &mut state)
                    .iter()
                    .filter(|c| matches!(c, Command::RedirectToLogin { .. }))
                    .count();
            }
        }

        mock.assert_async().await;
        assert_eq!(redirects, 1);
        assert_eq!(session.status(), SessionStatus::NoToken);
        assert!(store.load().unwrap().is_none());
    }
}
