use serde_json::Value;

use crate::backend_client::BackendClient;
use crate::errors::AppError;

/// Client for the interview-practice backend's session API.
#[derive(Clone)]
pub struct InterviewClient {
    backend: BackendClient,
}

impl InterviewClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            backend: BackendClient::new("Interview backend", base_url)?,
        })
    }

    pub async fn create_session(&self, body: &Value, token: Option<&str>) -> Result<Value, AppError> {
        self.backend.post_json("api/sessions", body, token).await
    }

    pub async fn get_session(&self, id: &str, token: Option<&str>) -> Result<Value, AppError> {
        self.backend
            .get_json(&format!("api/sessions/{id}"), token)
            .await
    }

    pub async fn submit_answer(
        &self,
        id: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Result<Value, AppError> {
        self.backend
            .post_json(&format!("api/sessions/{id}/answers"), body, token)
            .await
    }

    /// `None` when the backend has not produced feedback for the session.
    pub async fn get_feedback(&self, id: &str, token: Option<&str>) -> Result<Option<Value>, AppError> {
        match self
            .backend
            .get_json::<Value>(&format!("api/sessions/{id}/feedback"), token)
            .await
        {
            Ok(Value::Null) => Ok(None),
            Ok(feedback) => Ok(Some(feedback)),
            Err(AppError::Upstream { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
