use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Problem, ProblemId},
    error::ApiError,
    protocol::{hello_route, problem_route, problems_route, ProblemDraft},
};
use tracing::{debug, warn};

pub mod controller;
pub mod engine;
pub mod error;
pub mod notice;
pub mod settings;

pub use controller::{ListController, ListView, PendingDeletion};
pub use engine::{FilterState, SortKey};
pub use error::{ClientError, ControllerError};

/// Remote problem collection. One call per operation, no retries.
#[async_trait]
pub trait ProblemRepository: Send + Sync {
    async fn hello(&self) -> Result<String, ClientError>;
    async fn list_all(&self) -> Result<Vec<Problem>, ClientError>;
    async fn get_by_id(&self, id: ProblemId) -> Result<Problem, ClientError>;
    async fn create(&self, draft: &ProblemDraft) -> Result<Problem, ClientError>;
    async fn update(&self, id: ProblemId, draft: &ProblemDraft) -> Result<Problem, ClientError>;
    async fn remove(&self, id: ProblemId) -> Result<(), ClientError>;
}

#[derive(Debug, Clone)]
pub struct ProblemClient {
    http: Client,
    base_url: String,
}

impl ProblemClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn with_http_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    /// Sends the request and returns the body text of a 2xx response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ClientError> {
        let response = request.send().await.map_err(ClientError::Transport)?;
        let status = response.status();
        let body = response.text().await.map_err(ClientError::Transport)?;
        if !status.is_success() {
            let message = error_message(status, &body);
            warn!(status = status.as_u16(), %message, "problem request failed");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }
        debug!(status = status.as_u16(), bytes = body.len(), "problem request completed");
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let body = self.send(request).await?;
        if body.trim().is_empty() {
            return Err(ClientError::EmptyBody);
        }
        serde_json::from_str(&body).map_err(ClientError::Decode)
    }
}

/// Prefers the `message` of an `ApiError` body, then the raw body, then the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
        return api_error.message;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[async_trait]
impl ProblemRepository for ProblemClient {
    async fn hello(&self) -> Result<String, ClientError> {
        self.send(self.http.get(self.endpoint(hello_route()))).await
    }

    async fn list_all(&self) -> Result<Vec<Problem>, ClientError> {
        self.send_json(self.http.get(self.endpoint(problems_route())))
            .await
    }

    async fn get_by_id(&self, id: ProblemId) -> Result<Problem, ClientError> {
        self.send_json(self.http.get(self.endpoint(&problem_route(id))))
            .await
    }

    async fn create(&self, draft: &ProblemDraft) -> Result<Problem, ClientError> {
        self.send_json(self.http.post(self.endpoint(problems_route())).json(draft))
            .await
    }

    async fn update(&self, id: ProblemId, draft: &ProblemDraft) -> Result<Problem, ClientError> {
        self.send_json(self.http.put(self.endpoint(&problem_route(id))).json(draft))
            .await
    }

    async fn remove(&self, id: ProblemId) -> Result<(), ClientError> {
        self.send(self.http.delete(self.endpoint(&problem_route(id))))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
