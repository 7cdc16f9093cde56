//! Profile scraping behind a trait so the import handler never talks to Apify
//! directly. `AppState` carries an `Arc<dyn ProfileScraper>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::backend_client::read_json_response;
use crate::errors::AppError;

const APIFY_BASE_URL: &str = "https://api.apify.com/v2/acts";
/// Synchronous actor runs can take a while to finish scraping.
const SCRAPE_TIMEOUT_SECS: u64 = 120;

#[async_trait]
pub trait ProfileScraper: Send + Sync {
    /// Returns the raw scraper payload for one profile URL.
    async fn scrape(&self, profile_url: &str) -> Result<Value, AppError>;
}

/// Runs an Apify actor synchronously and returns the first dataset item.
pub struct ApifyScraper {
    client: Client,
    token: String,
    actor_id: String,
}

impl ApifyScraper {
    pub fn new(token: String, actor_id: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(SCRAPE_TIMEOUT_SECS))
                .build()?,
            token,
            actor_id,
        })
    }

    fn run_url(&self) -> String {
        format!(
            "{APIFY_BASE_URL}/{}/run-sync-get-dataset-items",
            self.actor_id
        )
    }
}

#[async_trait]
impl ProfileScraper for ApifyScraper {
    async fn scrape(&self, profile_url: &str) -> Result<Value, AppError> {
        info!("Scraping LinkedIn profile {profile_url} via actor {}", self.actor_id);
        let response = self
            .client
            .post(self.run_url())
            .query(&[("token", self.token.as_str())])
            .json(&json!({ "profileUrls": [profile_url] }))
            .send()
            .await
            .map_err(|e| {
                warn!("Apify request failed: {e}");
                AppError::Upstream {
                    status: 502,
                    message: "LinkedIn scraper is unreachable".to_string(),
                }
            })?;

        let items: Option<Vec<Value>> = read_json_response(response, "Apify")
            .await
            .map_err(as_gateway_error)?;
        first_profile(items.unwrap_or_default())
    }
}

/// Scraper failures come from our own token or actor configuration, so every
/// upstream status surfaces to the caller as 502.
fn as_gateway_error(err: AppError) -> AppError {
    match err {
        AppError::Upstream { status, message } => {
            warn!("Apify returned {status}: {message}");
            AppError::Upstream {
                status: 502,
                message: format!("LinkedIn scraper failed: {message}"),
            }
        }
        other => other,
    }
}

/// The dataset's first object item, or NotFound when the actor found nothing.
pub fn first_profile(items: Vec<Value>) -> Result<Value, AppError> {
    items
        .into_iter()
        .find(|item| item.as_object().is_some_and(|o| !o.is_empty()))
        .ok_or_else(|| AppError::NotFound("LinkedIn profile not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_url_includes_actor() {
        let scraper =
            ApifyScraper::new("tok".to_string(), "dev_fusion~linkedin-profile-scraper".to_string())
                .unwrap();
        assert_eq!(
            scraper.run_url(),
            "https://api.apify.com/v2/acts/dev_fusion~linkedin-profile-scraper/run-sync-get-dataset-items"
        );
    }

    #[test]
    fn test_empty_dataset_is_not_found() {
        assert!(matches!(first_profile(vec![]), Err(AppError::NotFound(_))));
        assert!(matches!(
            first_profile(vec![json!({}), json!(null)]),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_scraper_auth_and_actor_errors_become_bad_gateway() {
        for status in [401, 403, 404] {
            let err = as_gateway_error(AppError::Upstream {
                status,
                message: "token is not valid".into(),
            });
            assert!(matches!(err, AppError::Upstream { status: 502, .. }));
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
        }
        assert!(matches!(
            as_gateway_error(AppError::NotFound("x".into())),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn test_first_object_item_wins() {
        let items = vec![json!({}), json!({"fullName": "Ada"}), json!({"fullName": "Bob"})];
        assert_eq!(first_profile(items).unwrap()["fullName"], json!("Ada"));
    }
}
