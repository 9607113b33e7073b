use super::{ApiClient, ApiError};
use crate::types::Project;
use reqwest::Method;

/// Client for the login service, which owns projects and roles
#[derive(Debug, Clone)]
pub struct LoginApi {
    client: ApiClient,
}

impl LoginApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /api/projects`
    pub async fn projects(&self) -> Result<Vec<Project>, ApiError> {
        let request = self.client.request(Method::GET, &["api", "projects"])?;
        let projects: Option<Vec<Project>> = self.client.send(request).await?;
        Ok(projects.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryTokenStore, Session, SessionStatus};
    use crate::types::Role;
    use std::time::Duration;

    fn login_api(url: &str, session: Session) -> LoginApi {
        LoginApi::new(ApiClient::new(url, Duration::from_secs(5), session).unwrap())
    }

    #[tokio::test]
    async fn test_projects_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/projects")
            .match_header("authorization", "Bearer console-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success": true, "data": [
                    {"project_id": "p-1", "project_name": "Alpha", "role": "admin"},
                    {"project_id": "p-2", "project_name": "Beta", "role": "member"}
                ]}"#,
            )
            .create_async()
            .await;

        let session = Session::new(MemoryTokenStore::with_token("console-token"));
        session.bootstrap(None).unwrap();
        let projects = login_api(&server.url(), session).projects().await.unwrap();

        mock.assert_async().await;
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].role, Role::Admin);
        assert_eq!(projects[1].project_name, "Beta");
    }

    #[tokio::test]
    async fn test_projects_null_data_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/projects")
            .with_status(200)
            .with_body(r#"{"success": true, "data": null}"#)
            .create_async()
            .await;

        let session = Session::new(MemoryTokenStore::with_token("t"));
        session.bootstrap(None).unwrap();
        let projects = login_api(&server.url(), session).projects().await.unwrap();
        assert!(projects.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_expires_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/projects")
            .with_status(401)
            .with_body(r#"{"success": false, "error": "Invalid or expired token"}"#)
            .expect(1)
            .create_async()
            .await;

        let session = Session::new(MemoryTokenStore::with_token("stale"));
        session.bootstrap(None).unwrap();
        let api = login_api(&server.url(), session.clone());

        let err = api.projects().await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(err, ApiError::Unauthorized);
        assert_eq!(session.status(), SessionStatus::NoToken);
    }
}
