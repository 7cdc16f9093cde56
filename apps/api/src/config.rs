use anyhow::{Context, Result};

const DEFAULT_APIFY_ACTOR: &str = "dev_fusion~linkedin-profile-scraper";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub groq_api_key: String,
    pub apify_token: String,
    pub apify_actor_id: String,
    /// Java backend that owns users, organizations and auth.
    pub java_backend_url: String,
    /// Interview-practice backend (sessions, questions, feedback).
    pub interview_backend_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            groq_api_key: require_env("GROQ_API_KEY")?,
            apify_token: require_env("APIFY_TOKEN")?,
            apify_actor_id: optional_env("APIFY_ACTOR_ID", DEFAULT_APIFY_ACTOR),
            java_backend_url: trim_base_url(optional_env(
                "JAVA_BACKEND_URL",
                "http://localhost:8080",
            )),
            interview_backend_url: trim_base_url(optional_env(
                "INTERVIEW_BACKEND_URL",
                "http://localhost:5001",
            )),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_base_url_drops_trailing_slashes() {
        assert_eq!(
            trim_base_url("http://localhost:8080//".to_string()),
            "http://localhost:8080"
        );
        assert_eq!(
            trim_base_url("http://localhost:5001".to_string()),
            "http://localhost:5001"
        );
    }
}
