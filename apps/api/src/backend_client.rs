//! Thin JSON client for the services this API fronts: the Java backend
//! (users, organizations, auth) and the interview-practice backend.
//!
//! Errors are terminal for the request: no retries, the upstream status and
//! message are surfaced as `AppError::Upstream`.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    name: &'static str,
}

impl BackendClient {
    pub fn new(name: &'static str, base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            name,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match token {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, AppError> {
        self.send(self.request(Method::GET, path, token), path).await
    }

    pub async fn get_json_with_query<T, Q>(
        &self,
        path: &str,
        query: &Q,
        token: Option<&str>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(self.request(Method::GET, path, token).query(query), path)
            .await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::POST, path, token).json(body), path)
            .await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, path: &str) -> Result<T, AppError> {
        debug!("{} request: {path}", self.name);
        let response = builder.send().await.map_err(|e| {
            warn!("{} request to {path} failed: {e}", self.name);
            AppError::Upstream {
                status: 502,
                message: format!("{} is unreachable", self.name),
            }
        })?;
        read_json_response(response, self.name).await
    }
}

/// Ids are interpolated into upstream paths, so only URL-safe ids pass.
pub fn validate_path_id<'a>(id: &'a str, label: &str) -> Result<&'a str, AppError> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(AppError::Validation(format!("Invalid {label} '{id}'")))
    }
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
    error: Option<serde_json::Value>,
}

/// Extracts a human-readable message from an upstream error body.
pub fn upstream_message(body: &str, service: &str, status: u16) -> String {
    let parsed = serde_json::from_str::<UpstreamErrorBody>(body).ok();
    let from_json = parsed.and_then(|b| {
        b.message.or_else(|| match b.error {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Object(o)) => o
                .get("message")
                .and_then(|m| m.as_str())
                .map(String::from),
            _ => None,
        })
    });
    match from_json {
        Some(msg) if !msg.trim().is_empty() => msg,
        _ if !body.trim().is_empty() && body.len() <= 200 => body.trim().to_string(),
        _ => format!("{service} returned status {status}"),
    }
}

/// Maps a non-2xx response to `AppError::Upstream`, otherwise decodes JSON.
/// An empty 2xx body decodes as JSON `null`.
pub async fn read_json_response<T: DeserializeOwned>(
    response: Response,
    service: &str,
) -> Result<T, AppError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| AppError::Upstream {
        status: 502,
        message: format!("Failed to read {service} response: {e}"),
    })?;

    if !status.is_success() {
        return Err(AppError::Upstream {
            status: status.as_u16(),
            message: upstream_message(&body, service, status.as_u16()),
        });
    }

    let body = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(body).map_err(|e| AppError::Upstream {
        status: 502,
        message: format!("Unexpected {service} response: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = BackendClient::new("Java backend", "http://localhost:8080/").unwrap();
        assert_eq!(
            client.url("/api/users/me"),
            "http://localhost:8080/api/users/me"
        );
        assert_eq!(client.url("api/x"), "http://localhost:8080/api/x");
    }

    #[test]
    fn test_validate_path_id() {
        assert_eq!(validate_path_id("6650f1c2ab", "session id").unwrap(), "6650f1c2ab");
        assert!(validate_path_id("a1b2-c3_d4", "session id").is_ok());
        assert!(validate_path_id("", "session id").is_err());
        assert!(validate_path_id("../admin", "organization id").is_err());
        assert!(validate_path_id("id?x=1", "organization id").is_err());
    }

    #[test]
    fn test_upstream_message_variants() {
        assert_eq!(
            upstream_message(r#"{"message": "Organization not found"}"#, "Java backend", 404),
            "Organization not found"
        );
        assert_eq!(
            upstream_message(r#"{"error": {"message": "bad token"}}"#, "Apify", 401),
            "bad token"
        );
        assert_eq!(
            upstream_message(r#"{"error": "Session expired"}"#, "Interview backend", 410),
            "Session expired"
        );
        assert_eq!(upstream_message("", "Apify", 500), "Apify returned status 500");
        assert_eq!(upstream_message("Bad Gateway", "Apify", 502), "Bad Gateway");
    }
}
