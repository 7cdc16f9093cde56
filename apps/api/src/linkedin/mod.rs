//! LinkedIn profile import: URL validation, scraping, and mapping the scraped
//! payload onto CV sections.

pub mod coalesce;
pub mod handlers;
pub mod scraper;

use reqwest::Url;

use crate::errors::AppError;

/// Validates a LinkedIn profile URL and normalises it to
/// `https://www.linkedin.com/in/<slug>`. A missing scheme is tolerated.
pub fn validate_profile_url(raw: &str) -> Result<String, AppError> {
    let invalid = || AppError::Validation(format!("'{raw}' is not a LinkedIn profile URL"));

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("linkedinUrl is required".to_string()));
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&with_scheme).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    let host = url.host_str().ok_or_else(invalid)?.to_lowercase();
    if host != "linkedin.com" && !host.ends_with(".linkedin.com") {
        return Err(invalid());
    }

    let mut segments = url
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some("in"), Some(slug)) => Ok(format!("https://www.linkedin.com/in/{slug}")),
        _ => Err(invalid()),
    }
}
