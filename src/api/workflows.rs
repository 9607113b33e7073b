use super::{ApiClient, ApiError};
use crate::types::{
    ExecutionRequest, ExecutionResult, HideRequest, ShareRequest, Workflow, WorkflowPayload,
};
use reqwest::Method;
use serde_json::Value;

/// Client for the workflow service
#[derive(Debug, Clone)]
pub struct WorkflowApi {
    client: ApiClient,
}

impl WorkflowApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /api/projects/{project_id}/workflows`
    pub async fn list(&self, project_id: &str) -> Result<Vec<Workflow>, ApiError> {
        let request = self
            .client
            .request(Method::GET, &["api", "projects", project_id, "workflows"])?;
        let workflows: Option<Vec<Workflow>> = self.client.send(request).await?;
        Ok(workflows.unwrap_or_default())
    }

    /// `POST /api/workflows`
    pub async fn create(&self, payload: &WorkflowPayload) -> Result<(), ApiError> {
        let request = self
            .client
            .request(Method::POST, &["api", "workflows"])?
            .json(payload);
        let _: Value = self.client.send(request).await?;
        Ok(())
    }

    /// `PUT /api/workflows/{workflow_id}`
    pub async fn update(&self, workflow_id: &str, payload: &WorkflowPayload) -> Result<(), ApiError> {
        let request = self
            .client
            .request(Method::PUT, &["api", "workflows", workflow_id])?
            .json(payload);
        let _: Value = self.client.send(request).await?;
        Ok(())
    }

    /// `DELETE /api/workflows/{workflow_id}`
    pub async fn delete(&self, workflow_id: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .request(Method::DELETE, &["api", "workflows", workflow_id])?;
        let _: Value = self.client.send(request).await?;
        Ok(())
    }

    /// `POST /api/workflows/{workflow_id}/execute`
    pub async fn execute(
        &self,
        workflow_id: &str,
        body: &ExecutionRequest,
    ) -> Result<ExecutionResult, ApiError> {
        let request = self
            .client
            .request(Method::POST, &["api", "workflows", workflow_id, "execute"])?
            .json(body);
        self.client.send(request).await
    }

    /// `PUT /api/workflows/{workflow_id}/share`
    pub async fn share(&self, workflow_id: &str, is_shared: bool) -> Result<(), ApiError> {
        let request = self
            .client
            .request(Method::PUT, &["api", "workflows", workflow_id, "share"])?
            .json(&ShareRequest { is_shared });
        let _: Value = self.client.send(request).await?;
        Ok(())
    }

    /// `PUT /api/projects/{project_id}/workflows/{workflow_id}/hide`
    pub async fn hide(
        &self,
        project_id: &str,
        workflow_id: &str,
        is_hidden: bool,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .request(
                Method::PUT,
                &["api", "projects", project_id, "workflows", workflow_id, "hide"],
            )?
            .json(&HideRequest { is_hidden });
        let _: Value = self.client.send(request).await?;
        Ok(())
    }
}
