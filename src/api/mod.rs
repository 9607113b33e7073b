//! REST clients for the login service and the workflow service
//!
//! Both clients share [`ApiClient`], which:
//! - injects the console bearer token into every request
//! - unwraps the `{ success, data, error }` envelope
//! - normalizes non-2xx responses and transport failures into [`ApiError`]
//! - expires the session on any 401

mod login;
mod workflows;

pub use login::LoginApi;
pub use workflows::WorkflowApi;

use crate::session::Session;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Normalized failure of a backend call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The backend rejected the console token
    #[error("Session expired, please sign in again")]
    Unauthorized,

    /// Non-2xx status, with the backend's `error` message when it sent one
    #[error("{}", describe_http(.status, .message))]
    Http { status: u16, message: Option<String> },

    /// 2xx response whose envelope reported `success: false`
    #[error("{0}")]
    Rejected(String),

    /// Connection refused, timeout, DNS failure, ...
    #[error("{0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

fn describe_http(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("Request failed with status {status}"),
    }
}

impl ApiError {
    /// Message for the user: the backend's own text when there is one,
    /// otherwise `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Http {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Http { message: None, .. } | ApiError::Decode(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

/// Standard response envelope of both backends
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl<T: DeserializeOwned> Envelope<T> {
    fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.error
                    .unwrap_or_else(|| "Request was not successful".to_string()),
            ));
        }

        match self.data {
            Some(data) => Ok(data),
            // `data` may legitimately be absent for calls returning nothing
            None => T::deserialize(Value::Null).map_err(|e| ApiError::Decode(e.to_string())),
        }
    }
}

/// HTTP core shared by [`LoginApi`] and [`WorkflowApi`]
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, session: Session) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a URL from path segments; each segment is percent-encoded
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request with the console token attached
    pub(crate) fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("{} {}", method, url);

        let mut builder = self.http.request(method, url);
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Send a request and unwrap the envelope's `data`
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("Request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.session.expire();
            return Err(ApiError::Unauthorized);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.or(b.message))
                .filter(|m| !m.trim().is_empty());
            warn!("backend returned {}: {:?}", status, message);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        envelope.into_result()
    }
}
