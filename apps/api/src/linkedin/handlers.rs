use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cv::handlers::require_email;
use crate::cv::sections::CvSection;
use crate::cv::store;
use crate::errors::AppError;
use crate::linkedin::coalesce::{coalesce_profile, LinkedInProfile};
use crate::linkedin::validate_profile_url;
use crate::state::AppState;

/// Sections an import writes into the CV.
const IMPORTED_SECTIONS: [CvSection; 4] = [
    CvSection::PersonalInfo,
    CvSection::Experience,
    CvSection::Education,
    CvSection::Skills,
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub linkedin_url: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    #[serde(flatten)]
    pub profile: LinkedInProfile,
    pub saved_sections: Vec<CvSection>,
}

/// POST /api/linkedin/import
pub async fn handle_import(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    let profile_url = validate_profile_url(&req.linkedin_url)?;
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(require_email)
        .transpose()?;

    let raw = state.scraper.scrape(&profile_url).await?;
    let mut profile = coalesce_profile(&raw);
    if profile.profile_url.is_none() {
        profile.profile_url = Some(profile_url);
    }

    let mut saved_sections = Vec::new();
    if let Some(email) = email {
        let sections: Vec<_> = profile
            .clone()
            .into_cv_sections()
            .map_err(|e| AppError::Internal(e.into()))?
            .into_iter()
            .filter(|(section, _)| IMPORTED_SECTIONS.contains(section))
            .collect();
        store::save_sections(&state.db, &email, &sections)
            .await
            .map_err(AppError::Internal)?;
        saved_sections = sections.into_iter().map(|(s, _)| s).collect();
        info!("Imported LinkedIn profile into CV for {email}");
    }

    Ok(Json(ImportResponse {
        profile,
        saved_sections,
    }))
}
