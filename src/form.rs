//! Create/edit form for workflow records
//!
//! Validation collects every problem at once: all required fields that are
//! blank and both JSON fields that fail to parse are reported together, and
//! submission is refused while any remain.

use crate::editor::{TextEdit, TextEditor};
use crate::types::{cycle, HttpMethod, Source, TemplateName, Workflow, WorkflowPayload};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    WorkflowName,
    Description,
    Source,
    TemplateName,
    HttpMethod,
    BaseUrl,
    BearerToken,
    ExternalWorkflowId,
    Parameters,
    Headers,
}

impl FormField {
    /// Fields in display and focus order
    pub const ALL: [FormField; 10] = [
        FormField::WorkflowName,
        FormField::Description,
        FormField::Source,
        FormField::TemplateName,
        FormField::HttpMethod,
        FormField::BaseUrl,
        FormField::BearerToken,
        FormField::ExternalWorkflowId,
        FormField::Parameters,
        FormField::Headers,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::WorkflowName => "Workflow Name *",
            FormField::Description => "Description *",
            FormField::Source => "Source *",
            FormField::TemplateName => "Template *",
            FormField::HttpMethod => "HTTP Method *",
            FormField::BaseUrl => "Base URL *",
            FormField::BearerToken => "Bearer Token *",
            FormField::ExternalWorkflowId => "External Workflow ID *",
            FormField::Parameters => "Parameters (JSON)",
            FormField::Headers => "Headers (JSON)",
        }
    }

    /// Enum-valued fields are cycled rather than typed into
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FormField::Source | FormField::TemplateName | FormField::HttpMethod
        )
    }

    pub fn is_multiline(&self) -> bool {
        matches!(
            self,
            FormField::Description | FormField::Parameters | FormField::Headers
        )
    }

    fn required_message(&self) -> Option<&'static str> {
        match self {
            FormField::WorkflowName => Some("Workflow name is required"),
            FormField::Description => Some("Description is required"),
            FormField::BaseUrl => Some("Base URL is required"),
            FormField::BearerToken => Some("Bearer token is required"),
            FormField::ExternalWorkflowId => Some("Workflow ID is required"),
            _ => None,
        }
    }
}

/// Whether the form creates a record or updates an existing one
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit(String),
}

/// Every invalid field with its message
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormErrors(pub BTreeMap<FormField, String>);

impl FormErrors {
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> Vec<FormField> {
        self.0.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}

#[derive(Debug, Clone)]
pub struct WorkflowForm {
    pub mode: FormMode,
    pub project_id: String,
    pub source: Source,
    pub template_name: TemplateName,
    pub http_method: HttpMethod,
    texts: BTreeMap<FormField, TextEditor>,
    pub focus: FormField,
    pub errors: FormErrors,
    /// Save request in flight
    pub saving: bool,
    /// Backend failure from the last save attempt
    pub submit_error: Option<String>,
}

impl WorkflowForm {
    /// Empty form for a new workflow in `project_id`
    pub fn create(project_id: &str) -> Self {
        let mut texts = BTreeMap::new();
        for field in FormField::ALL.iter().filter(|f| !f.is_choice()) {
            let initial = match field {
                FormField::Parameters | FormField::Headers => "{}",
                _ => "",
            };
            texts.insert(*field, Self::editor_for(*field, initial));
        }

        Self {
            mode: FormMode::Create,
            project_id: project_id.to_string(),
            source: Source::default(),
            template_name: TemplateName::default(),
            http_method: HttpMethod::default(),
            texts,
            focus: FormField::WorkflowName,
            errors: FormErrors::default(),
            saving: false,
            submit_error: None,
        }
    }

    /// Form pre-filled from an existing record
    pub fn edit(workflow: &Workflow) -> Self {
        let mut form = Self::create(&workflow.project_id);
        form.mode = FormMode::Edit(workflow.workflow_id.clone());
        form.source = workflow.source;
        form.template_name = workflow.template_name;
        form.http_method = workflow.http_method;

        let parameters = serde_json::to_string_pretty(&workflow.parameters)
            .unwrap_or_else(|_| "{}".to_string());
        let headers =
            serde_json::to_string_pretty(&workflow.headers).unwrap_or_else(|_| "{}".to_string());

        let values = [
            (FormField::WorkflowName, workflow.workflow_name.as_str()),
            (FormField::Description, workflow.description.as_str()),
            (FormField::BaseUrl, workflow.base_url.as_str()),
            (FormField::BearerToken, workflow.bearer_token.as_str()),
            (
                FormField::ExternalWorkflowId,
                workflow.external_workflow_id.as_str(),
            ),
            (FormField::Parameters, parameters.as_str()),
            (FormField::Headers, headers.as_str()),
        ];
        for (field, value) in values {
            form.texts.insert(field, Self::editor_for(field, value));
        }
        form
    }

    fn editor_for(field: FormField, initial: &str) -> TextEditor {
        let editor = TextEditor::with_content(initial);
        if field.is_multiline() {
            editor.multiline()
        } else {
            editor
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn title(&self) -> &'static str {
        if self.is_edit() {
            " Edit Workflow "
        } else {
            " Create Workflow "
        }
    }

    pub fn editor(&self, field: FormField) -> Option<&TextEditor> {
        self.texts.get(&field)
    }

    pub fn text(&self, field: FormField) -> &str {
        self.texts.get(&field).map(|e| e.content()).unwrap_or("")
    }

    /// Display value of an enum field
    pub fn choice(&self, field: FormField) -> Option<&'static str> {
        match field {
            FormField::Source => Some(self.source.as_str()),
            FormField::TemplateName => Some(self.template_name.as_str()),
            FormField::HttpMethod => Some(self.http_method.as_str()),
            _ => None,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = cycle(&FormField::ALL, self.focus, true);
    }

    pub fn focus_prev(&mut self) {
        self.focus = cycle(&FormField::ALL, self.focus, false);
    }

    /// Edit the focused text field; editing clears that field's error
    pub fn apply_edit(&mut self, edit: TextEdit) {
        if let Some(editor) = self.texts.get_mut(&self.focus) {
            if editor.apply(edit) {
                self.errors.0.remove(&self.focus);
            }
        }
    }

    /// Step the focused enum field to its next or previous value
    pub fn cycle_choice(&mut self, forward: bool) {
        match self.focus {
            FormField::Source => self.source = cycle(&Source::ALL, self.source, forward),
            FormField::TemplateName => {
                self.template_name = cycle(&TemplateName::ALL, self.template_name, forward)
            }
            FormField::HttpMethod => {
                self.http_method = cycle(&HttpMethod::ALL, self.http_method, forward)
            }
            _ => {}
        }
    }

    /// Check every field and build the payload
    pub fn validate(&self) -> Result<WorkflowPayload, FormErrors> {
        let mut errors = BTreeMap::new();

        for field in FormField::ALL {
            if let Some(message) = field.required_message() {
                if self.editor(field).is_some_and(TextEditor::is_blank) {
                    errors.insert(field, message.to_string());
                }
            }
        }

        let parameters = self.parse_json_field(FormField::Parameters, &mut errors);
        let headers = self.parse_json_field(FormField::Headers, &mut errors);

        if !errors.is_empty() {
            return Err(FormErrors(errors));
        }

        Ok(WorkflowPayload {
            workflow_name: self.text(FormField::WorkflowName).to_string(),
            description: self.text(FormField::Description).to_string(),
            source: self.source,
            template_name: self.template_name,
            http_method: self.http_method,
            base_url: self.text(FormField::BaseUrl).to_string(),
            bearer_token: self.text(FormField::BearerToken).to_string(),
            external_workflow_id: self.text(FormField::ExternalWorkflowId).to_string(),
            parameters: parameters.unwrap_or(Value::Null),
            headers: headers.unwrap_or(Value::Null),
            project_id: self.project_id.clone(),
        })
    }

    fn parse_json_field(
        &self,
        field: FormField,
        errors: &mut BTreeMap<FormField, String>,
    ) -> Option<Value> {
        match serde_json::from_str::<Value>(self.text(field)) {
            Ok(value) => Some(value),
            Err(_) => {
                errors.insert(field, "Invalid JSON format".to_string());
                None
            }
        }
    }

    /// Validate and, when valid, mark the form as saving
    ///
    /// Returns what the caller should send: create or update, and the body.
    pub fn submit(&mut self) -> Result<(FormMode, WorkflowPayload), FormErrors> {
        match self.validate() {
            Ok(payload) => {
                self.errors = FormErrors::default();
                self.submit_error = None;
                self.saving = true;
                Ok((self.mode.clone(), payload))
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn type_into(form: &mut WorkflowForm, field: FormField, text: &str) {
        form.focus = field;
        form.apply_edit(TextEdit::Clear);
        for c in text.chars() {
            form.apply_edit(TextEdit::Insert(c));
        }
    }

    fn filled_form() -> WorkflowForm {
        let mut form = WorkflowForm::create("p-1");
        type_into(&mut form, FormField::WorkflowName, "Echo");
        type_into(&mut form, FormField::Description, "Echo input back");
        type_into(&mut form, FormField::BaseUrl, "https://api.coze.example/run");
        type_into(&mut form, FormField::BearerToken, "pat_123");
        type_into(&mut form, FormField::ExternalWorkflowId, "7391");
        form
    }

    fn sample_workflow() -> Workflow {
        serde_json::from_value(json!({
            "workflow_id": "wf-9",
            "workflow_name": "Translate",
            "description": "Translate text",
            "source": "n8n",
            "template_name": "streamflow",
            "http_method": "GET",
            "base_url": "https://n8n.example/webhook/1",
            "bearer_token": "secret",
            "external_workflow_id": "55",
            "parameters": {"lang": "fr"},
            "headers": {"X-Env": "prod"},
            "project_id": "p-7"
        }))
        .unwrap()
    }

    #[test]
    fn test_new_form_defaults() {
        let form = WorkflowForm::create("p-1");
        assert_eq!(form.mode, FormMode::Create);
        assert_eq!(form.source, Source::Coze);
        assert_eq!(form.template_name, TemplateName::Workflow);
        assert_eq!(form.http_method, HttpMethod::Post);
        assert_eq!(form.text(FormField::Parameters), "{}");
        assert_eq!(form.text(FormField::Headers), "{}");
    }

    #[test]
    fn test_empty_form_reports_all_required_fields() {
        let form = WorkflowForm::create("p-1");
        let errors = form.validate().unwrap_err();

        assert_eq!(
            errors.fields(),
            vec![
                FormField::WorkflowName,
                FormField::Description,
                FormField::BaseUrl,
                FormField::BearerToken,
                FormField::ExternalWorkflowId,
            ]
        );
    }

    #[test]
    fn test_all_violations_reported_together() {
        let mut form = WorkflowForm::create("p-1");
        type_into(&mut form, FormField::Parameters, "{not json");
        type_into(&mut form, FormField::Headers, "[");

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.0.len(), 7);
        assert_eq!(errors.get(FormField::Parameters), Some("Invalid JSON format"));
        assert_eq!(errors.get(FormField::Headers), Some("Invalid JSON format"));
    }

    #[test]
    fn test_whitespace_only_is_blank() {
        let mut form = filled_form();
        type_into(&mut form, FormField::WorkflowName, "   ");
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.fields(), vec![FormField::WorkflowName]);
    }

    #[test]
    fn test_json_fields_accept_any_value() {
        let mut form = filled_form();
        type_into(&mut form, FormField::Parameters, "[1, 2, 3]");
        type_into(&mut form, FormField::Headers, "null");

        let payload = form.validate().unwrap();
        assert_eq!(payload.parameters, json!([1, 2, 3]));
        assert_eq!(payload.headers, Value::Null);
    }

    #[test]
    fn test_valid_form_builds_payload() {
        let mut form = filled_form();
        type_into(&mut form, FormField::Parameters, r#"{"input": "hello"}"#);
        form.focus = FormField::HttpMethod;
        form.cycle_choice(true);

        let (mode, payload) = form.submit().unwrap();
        assert_eq!(mode, FormMode::Create);
        assert!(form.saving);
        assert_eq!(payload.workflow_name, "Echo");
        assert_eq!(payload.http_method, HttpMethod::Put);
        assert_eq!(payload.parameters, json!({"input": "hello"}));
        assert_eq!(payload.headers, json!({}));
        assert_eq!(payload.project_id, "p-1");
    }

    #[test]
    fn test_submit_blocked_keeps_errors() {
        let mut form = filled_form();
        type_into(&mut form, FormField::Headers, "{bad");

        assert!(form.submit().is_err());
        assert!(!form.saving);
        assert_eq!(form.errors.fields(), vec![FormField::Headers]);
    }

    #[test]
    fn test_editing_clears_field_error() {
        let mut form = WorkflowForm::create("p-1");
        let _ = form.submit();
        assert!(form.errors.get(FormField::WorkflowName).is_some());

        form.focus = FormField::WorkflowName;
        form.apply_edit(TextEdit::Insert('x'));
        assert!(form.errors.get(FormField::WorkflowName).is_none());
        assert!(form.errors.get(FormField::Description).is_some());
    }

    #[test]
    fn test_edit_mode_prefills_and_updates() {
        let form = WorkflowForm::edit(&sample_workflow());
        assert_eq!(form.mode, FormMode::Edit("wf-9".to_string()));
        assert_eq!(form.project_id, "p-7");
        assert_eq!(form.source, Source::N8n);
        assert_eq!(form.http_method, HttpMethod::Get);
        assert_eq!(form.text(FormField::BearerToken), "secret");

        let payload = form.validate().unwrap();
        assert_eq!(payload.parameters, json!({"lang": "fr"}));
        assert_eq!(payload.headers, json!({"X-Env": "prod"}));
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = WorkflowForm::create("p-1");
        form.focus_prev();
        assert_eq!(form.focus, FormField::Headers);
        form.focus_next();
        assert_eq!(form.focus, FormField::WorkflowName);
    }

    #[test]
    fn test_choice_fields_ignore_text_edits() {
        let mut form = WorkflowForm::create("p-1");
        form.focus = FormField::Source;
        form.apply_edit(TextEdit::Insert('x'));
        assert_eq!(form.choice(FormField::Source), Some("coze"));
        form.cycle_choice(false);
        assert_eq!(form.source, Source::N8n);
    }
}
