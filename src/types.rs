use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Stored parameters are whatever JSON the record was saved with;
/// `null` or a missing field reads as `{}`
fn parameters_or_empty<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(empty_object()),
        other => Ok(other),
    }
}

/// Headers as a string map, whatever JSON the record was saved with
///
/// Scalars are rendered as text, `null` entries are dropped and anything
/// other than an object reads as no headers.
fn lenient_headers<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(map) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect())
}

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Third-party automation service a workflow points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Coze,
    N8n,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Coze, Source::N8n];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Coze => "coze",
            Source::N8n => "n8n",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateName {
    #[default]
    Workflow,
    Streamflow,
}

impl TemplateName {
    pub const ALL: [TemplateName; 2] = [TemplateName::Workflow, TemplateName::Streamflow];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateName::Workflow => "workflow",
            TemplateName::Streamflow => "streamflow",
        }
    }
}

/// HTTP method the backend uses when relaying to the target service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 3] = [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// Step to the neighbouring value of a small enum, wrapping at both ends
pub fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let len = all.len();
    let index = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    all[next]
}

/// Per-project role of the signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    /// Admins may create, edit, share, hide and delete workflows
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

/// Project as reported by the login service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub project_name: String,
    #[serde(default)]
    pub role: Role,
}

/// A stored configuration describing how to call an external automation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub workflow_id: String,
    pub workflow_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub template_name: TemplateName,
    #[serde(default)]
    pub http_method: HttpMethod,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub bearer_token: String,
    #[serde(default)]
    pub external_workflow_id: String,
    #[serde(default = "empty_object", deserialize_with = "parameters_or_empty")]
    pub parameters: Value,
    #[serde(default, deserialize_with = "lenient_headers")]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default)]
    pub is_hidden: bool,
    pub project_id: String,

    // Read-only bookkeeping returned by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_did: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Body of the create and update calls
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowPayload {
    pub workflow_name: String,
    pub description: String,
    pub source: Source,
    pub template_name: TemplateName,
    pub http_method: HttpMethod,
    pub base_url: String,
    pub bearer_token: String,
    pub external_workflow_id: String,
    pub parameters: Value,
    pub headers: Value,
    pub project_id: String,
}

/// Body of the execute call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRequest {
    pub parameters: Value,
    pub headers: BTreeMap<String, String>,
}

/// Outbound request as performed by the backend relay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestTrace {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Value,
}

/// Response the target service returned to the relay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTrace {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Value,
}

impl ResponseTrace {
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Request/response pair produced by one execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub request: RequestTrace,
    pub response: ResponseTrace,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRequest {
    pub is_shared: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HideRequest {
    pub is_hidden: bool,
}

/// Loading status of the workflow list
#[derive(Debug, Clone, PartialEq)]
pub enum LoadingState {
    Idle,
    Fetching,
    Complete,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_decodes_backend_record() {
        let workflow: Workflow = serde_json::from_value(json!({
            "workflow_id": "wf-1",
            "workflow_name": "Summarize",
            "description": "Summarize a document",
            "source": "n8n",
            "template_name": "streamflow",
            "http_method": "PUT",
            "base_url": "https://n8n.example.com/webhook/abc",
            "bearer_token": "secret",
            "external_workflow_id": "123",
            "parameters": {"lang": "en", "limit": 3},
            "headers": {"X-Trace": "1"},
            "project_id": "p-1",
            "creator_did": "did:example:1",
            "is_shared": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(workflow.source, Source::N8n);
        assert_eq!(workflow.template_name, TemplateName::Streamflow);
        assert_eq!(workflow.http_method, HttpMethod::Put);
        assert_eq!(workflow.parameters["limit"], json!(3));
        assert_eq!(workflow.headers["X-Trace"], "1");
        assert!(workflow.is_shared);
        assert!(!workflow.is_hidden);
    }

    #[test]
    fn test_workflow_null_maps_default_to_empty() {
        let workflow: Workflow = serde_json::from_value(json!({
            "workflow_id": "wf-1",
            "workflow_name": "Echo",
            "project_id": "p-1",
            "parameters": null,
            "headers": null
        }))
        .unwrap();

        assert_eq!(workflow.parameters, json!({}));
        assert!(workflow.headers.is_empty());
        assert_eq!(workflow.http_method, HttpMethod::Post);
        assert_eq!(workflow.source, Source::Coze);
    }

    #[test]
    fn test_workflow_with_loose_json_still_decodes() {
        let workflow: Workflow = serde_json::from_value(json!({
            "workflow_id": "wf-1",
            "workflow_name": "Echo",
            "project_id": "p-1",
            "parameters": [1, 2],
            "headers": {"X-Retry": 3, "X-Debug": true, "X-Gone": null, "X-Name": "a"}
        }))
        .unwrap();

        assert_eq!(workflow.parameters, json!([1, 2]));
        assert_eq!(workflow.headers["X-Retry"], "3");
        assert_eq!(workflow.headers["X-Debug"], "true");
        assert_eq!(workflow.headers["X-Name"], "a");
        assert!(!workflow.headers.contains_key("X-Gone"));

        let workflow: Workflow = serde_json::from_value(json!({
            "workflow_id": "wf-2",
            "workflow_name": "Echo",
            "project_id": "p-1",
            "headers": ["not", "a", "map"]
        }))
        .unwrap();
        assert!(workflow.headers.is_empty());
        assert_eq!(workflow.parameters, json!({}));
    }

    #[test]
    fn test_project_role() {
        let project: Project = serde_json::from_value(json!({
            "project_id": "p-1",
            "project_name": "Alpha",
            "role": "admin"
        }))
        .unwrap();
        assert!(project.role.can_manage());
        assert!(!Role::Member.can_manage());
    }

    #[test]
    fn test_payload_serializes_wire_names() {
        let payload = WorkflowPayload {
            workflow_name: "Echo".to_string(),
            description: "Echo input".to_string(),
            source: Source::N8n,
            template_name: TemplateName::Workflow,
            http_method: HttpMethod::Get,
            base_url: "https://example.com".to_string(),
            bearer_token: "t".to_string(),
            external_workflow_id: "42".to_string(),
            parameters: json!({}),
            headers: json!({}),
            project_id: "p-1".to_string(),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["source"], "n8n");
        assert_eq!(value["template_name"], "workflow");
        assert_eq!(value["http_method"], "GET");
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle(&HttpMethod::ALL, HttpMethod::Put, true), HttpMethod::Get);
        assert_eq!(cycle(&HttpMethod::ALL, HttpMethod::Get, false), HttpMethod::Put);
        assert_eq!(cycle(&Source::ALL, Source::Coze, true), Source::N8n);
    }

    #[test]
    fn test_response_status_classification() {
        let ok = ResponseTrace {
            status: 204,
            ..Default::default()
        };
        let failed = ResponseTrace {
            status: 404,
            ..Default::default()
        };
        assert!(ok.is_success());
        assert!(!failed.is_success());
    }
}
