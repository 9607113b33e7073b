//! Execution relay: turn a workflow record into an execute request and hold
//! the redacted request/response trace that comes back.

use crate::api::ApiError;
use crate::editor::{TextEdit, TextEditor};
use crate::types::{ExecutionRequest, ExecutionResult, Workflow};
use std::collections::BTreeMap;
use thiserror::Error;

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";
const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelayError {
    #[error("invalid JSON in parameters: {0}")]
    InvalidParameters(String),

    #[error("an execution is already running")]
    AlreadyRunning,
}

/// Headers sent with every execution of `workflow`
///
/// Record headers extend and override the defaults, except for
/// `Authorization` (any casing), which always comes from `bearer_token`.
pub fn effective_headers(workflow: &Workflow) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert(
        AUTHORIZATION.to_string(),
        format!("{BEARER_PREFIX}{}", workflow.bearer_token),
    );
    headers.insert(CONTENT_TYPE.to_string(), "application/json".to_string());

    for (key, value) in &workflow.headers {
        if key.eq_ignore_ascii_case(AUTHORIZATION) {
            continue;
        }
        // a record header differing only in case replaces the default key
        headers.retain(|existing: &String, _| !existing.eq_ignore_ascii_case(key));
        headers.insert(key.clone(), value.clone());
    }

    headers
}

/// Build the execute body from a workflow and the user's parameter text
pub fn build_execution_request(
    workflow: &Workflow,
    parameters_text: &str,
) -> Result<ExecutionRequest, RelayError> {
    let parameters = serde_json::from_str(parameters_text)
        .map_err(|e| RelayError::InvalidParameters(e.to_string()))?;

    Ok(ExecutionRequest {
        parameters,
        headers: effective_headers(workflow),
    })
}

/// Mask everything after `Bearer `, keeping the length in characters
pub fn redact_authorization(value: &str) -> String {
    match value.strip_prefix(BEARER_PREFIX) {
        Some(secret) => format!("{BEARER_PREFIX}{}", "*".repeat(secret.chars().count())),
        None => value.to_string(),
    }
}

/// Redact the `Authorization` header of a returned request trace
pub fn redact_trace(mut result: ExecutionResult) -> ExecutionResult {
    for (key, value) in result.request.headers.iter_mut() {
        if key.eq_ignore_ascii_case(AUTHORIZATION) {
            *value = redact_authorization(value);
        }
    }
    result
}

fn pretty_parameters(workflow: &Workflow) -> String {
    serde_json::to_string_pretty(&workflow.parameters).unwrap_or_else(|_| "{}".to_string())
}

/// State of the execute modal for one workflow
#[derive(Debug, Clone)]
pub struct ExecutionPanel {
    pub workflow: Workflow,
    pub parameters: TextEditor,
    /// Id of the execution currently in flight
    running: Option<u64>,
    /// Last successful trace, already redacted
    pub result: Option<ExecutionResult>,
    pub error: Option<String>,
    pub scroll: u16,
}

impl ExecutionPanel {
    pub fn new(workflow: Workflow) -> Self {
        let parameters = TextEditor::with_content(pretty_parameters(&workflow)).multiline();
        Self {
            workflow,
            parameters,
            running: None,
            result: None,
            error: None,
            scroll: 0,
        }
    }

    /// Headers as they will be sent, for read-only display
    pub fn headers(&self) -> BTreeMap<String, String> {
        effective_headers(&self.workflow)
    }

    pub fn in_flight(&self) -> bool {
        self.running.is_some()
    }

    /// Validate the parameters and mark execution `run_id` as running
    ///
    /// Nothing changes on error, so the previous result stays visible.
    pub fn begin(&mut self, run_id: u64) -> Result<ExecutionRequest, RelayError> {
        if self.in_flight() {
            return Err(RelayError::AlreadyRunning);
        }

        match build_execution_request(&self.workflow, self.parameters.content()) {
            Ok(request) => {
                self.running = Some(run_id);
                self.error = None;
                Ok(request)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Apply the outcome of execution `run_id`
    ///
    /// Outcomes of any other execution are ignored and false is returned.
    pub fn finish(&mut self, run_id: u64, outcome: Result<ExecutionResult, ApiError>) -> bool {
        if self.running != Some(run_id) {
            return false;
        }
        self.running = None;
        match outcome {
            Ok(result) => {
                self.result = Some(redact_trace(result));
                self.error = None;
                self.scroll = 0;
            }
            Err(e) => {
                self.error = Some(e.user_message("Failed to execute workflow"));
            }
        }
        true
    }

    pub fn edit_parameters(&mut self, edit: TextEdit) {
        self.parameters.apply(edit);
    }

    pub fn reformat(&mut self) {
        if let Err(e) = self.parameters.format_json() {
            self.error = Some(e);
        } else {
            self.error = None;
        }
    }

    /// Restore the record's stored parameters
    pub fn reset(&mut self) {
        self.parameters = TextEditor::with_content(pretty_parameters(&self.workflow)).multiline();
        self.error = None;
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(3);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(3);
    }

    /// Redacted request trace as pretty JSON, for the clipboard
    pub fn request_text(&self) -> Option<String> {
        self.result
            .as_ref()
            .and_then(|r| serde_json::to_string_pretty(&r.request).ok())
    }

    pub fn response_text(&self) -> Option<String> {
        self.result
            .as_ref()
            .and_then(|r| serde_json::to_string_pretty(&r.response.body).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RequestTrace, ResponseTrace};
    use serde_json::json;

    fn workflow(headers: serde_json::Value) -> Workflow {
        serde_json::from_value(json!({
            "workflow_id": "wf-1",
            "workflow_name": "Echo",
            "bearer_token": "pat_secret",
            "parameters": {"input": "hello"},
            "headers": headers,
            "project_id": "p-1"
        }))
        .unwrap()
    }

    fn trace(authorization: &str) -> ExecutionResult {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), authorization.to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        ExecutionResult {
            request: RequestTrace {
                method: "POST".to_string(),
                url: "https://api.coze.example/run".to_string(),
                headers,
                body: json!({"parameters": {"input": "hello"}}),
            },
            response: ResponseTrace {
                status: 200,
                status_text: "OK".to_string(),
                headers: BTreeMap::new(),
                body: json!({"output": "hello"}),
            },
        }
    }

    #[test]
    fn test_default_headers() {
        let headers = effective_headers(&workflow(json!({})));
        assert_eq!(headers["Authorization"], "Bearer pat_secret");
        assert_eq!(headers["Content-Type"], "application/json");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_record_headers_extend_and_override() {
        let headers = effective_headers(&workflow(json!({
            "X-Env": "prod",
            "content-type": "text/plain"
        })));
        assert_eq!(headers["X-Env"], "prod");
        assert_eq!(headers["content-type"], "text/plain");
        assert!(!headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_stored_authorization_is_ignored() {
        for key in ["Authorization", "authorization", "AUTHORIZATION"] {
            let headers = effective_headers(&workflow(json!({key: "Bearer stale"})));
            assert_eq!(headers["Authorization"], "Bearer pat_secret");
            assert_eq!(headers.len(), 2);
        }
    }

    #[test]
    fn test_build_request_parses_parameters() {
        let request = build_execution_request(&workflow(json!({})), r#"{"n": [1, 2]}"#).unwrap();
        assert_eq!(request.parameters, json!({"n": [1, 2]}));
        assert_eq!(request.headers["Authorization"], "Bearer pat_secret");
    }

    #[test]
    fn test_build_request_rejects_invalid_json() {
        let err = build_execution_request(&workflow(json!({})), "{input: }").unwrap_err();
        assert!(matches!(err, RelayError::InvalidParameters(_)));
        assert!(err.to_string().starts_with("invalid JSON in parameters"));
    }

    #[test]
    fn test_redaction_preserves_length() {
        let original = "Bearer pat_secret";
        let redacted = redact_authorization(original);
        assert_eq!(redacted, "Bearer **********");
        assert_eq!(redacted.len(), original.len());
    }

    #[test]
    fn test_redaction_counts_characters() {
        assert_eq!(redact_authorization("Bearer ñé"), "Bearer **");
        assert_eq!(redact_authorization("Bearer "), "Bearer ");
    }

    #[test]
    fn test_redaction_requires_exact_prefix() {
        assert_eq!(redact_authorization("Basic dXNlcg=="), "Basic dXNlcg==");
        assert_eq!(redact_authorization("bearer abc"), "bearer abc");
    }

    #[test]
    fn test_redact_trace_touches_only_authorization() {
        let redacted = redact_trace(trace("Bearer pat_secret"));
        assert_eq!(redacted.request.headers["Authorization"], "Bearer **********");
        assert_eq!(redacted.request.headers["Content-Type"], "application/json");
        assert_eq!(redacted.request.body, json!({"parameters": {"input": "hello"}}));
        assert_eq!(redacted.response.body, json!({"output": "hello"}));
    }

    #[test]
    fn test_panel_starts_with_record_parameters() {
        let panel = ExecutionPanel::new(workflow(json!({})));
        assert_eq!(
            panel.parameters.parse_json().unwrap(),
            json!({"input": "hello"})
        );
        assert!(!panel.in_flight());
    }

    #[test]
    fn test_panel_single_execution_in_flight() {
        let mut panel = ExecutionPanel::new(workflow(json!({})));
        assert!(panel.begin(1).is_ok());
        assert!(panel.in_flight());
        assert_eq!(panel.begin(2).unwrap_err(), RelayError::AlreadyRunning);

        assert!(panel.finish(1, Ok(trace("Bearer pat_secret"))));
        assert!(!panel.in_flight());
        assert!(panel.begin(3).is_ok());
    }

    #[test]
    fn test_panel_ignores_other_runs() {
        let mut panel = ExecutionPanel::new(workflow(json!({})));
        panel.begin(7).unwrap();

        assert!(!panel.finish(6, Ok(trace("Bearer pat_secret"))));
        assert!(panel.in_flight());
        assert!(panel.result.is_none());

        assert!(panel.finish(7, Ok(trace("Bearer pat_secret"))));
        assert!(!panel.in_flight());
        assert!(panel.result.is_some());
    }

    #[test]
    fn test_panel_invalid_json_does_not_start() {
        let mut panel = ExecutionPanel::new(workflow(json!({})));
        panel.edit_parameters(TextEdit::Clear);
        panel.edit_parameters(TextEdit::Paste("{oops".to_string()));

        assert!(panel.begin(1).is_err());
        assert!(!panel.in_flight());
        assert!(panel
            .error
            .as_deref()
            .unwrap()
            .starts_with("invalid JSON in parameters"));
    }

    #[test]
    fn test_failure_keeps_previous_result() {
        let mut panel = ExecutionPanel::new(workflow(json!({})));
        panel.begin(1).unwrap();
        panel.finish(1, Ok(trace("Bearer pat_secret")));

        panel.begin(2).unwrap();
        panel.finish(2, Err(ApiError::Http {
            status: 502,
            message: None,
        }));

        assert_eq!(panel.error.as_deref(), Some("Failed to execute workflow"));
        let kept = panel.result.as_ref().unwrap();
        assert_eq!(kept.request.headers["Authorization"], "Bearer **********");
    }

    #[test]
    fn test_backend_message_surfaced_verbatim() {
        let mut panel = ExecutionPanel::new(workflow(json!({})));
        panel.begin(3).unwrap();
        panel.finish(3, Err(ApiError::Http {
            status: 500,
            message: Some("Failed to execute workflow: upstream timeout".to_string()),
        }));
        assert_eq!(
            panel.error.as_deref(),
            Some("Failed to execute workflow: upstream timeout")
        );
    }

    #[test]
    fn test_reset_and_reformat() {
        let mut panel = ExecutionPanel::new(workflow(json!({})));
        panel.edit_parameters(TextEdit::Clear);
        panel.edit_parameters(TextEdit::Paste(r#"{"a":1}"#.to_string()));
        panel.reformat();
        assert_eq!(panel.parameters.content(), "{\n  \"a\": 1\n}");

        panel.reset();
        assert_eq!(
            panel.parameters.parse_json().unwrap(),
            json!({"input": "hello"})
        );
    }

    #[test]
    fn test_copy_texts_are_redacted() {
        let mut panel = ExecutionPanel::new(workflow(json!({})));
        assert!(panel.request_text().is_none());
        panel.begin(4).unwrap();
        panel.finish(4, Ok(trace("Bearer pat_secret")));

        let request = panel.request_text().unwrap();
        assert!(request.contains("Bearer **********"));
        assert!(!request.contains("pat_secret"));
        assert!(panel.response_text().unwrap().contains("output"));
    }
}
