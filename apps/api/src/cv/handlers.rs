//! Axum route handlers for the CV builder API.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cv::completeness::{compute_completeness_report, CompletenessReport};
use crate::cv::export::render_markdown;
use crate::cv::prompts::{SUMMARY_PROMPT, SUMMARY_SYSTEM};
use crate::cv::render::{render_document, CvTemplate, DocumentDefinition};
use crate::cv::sections::{CvDocument, CvSection};
use crate::cv::store::{self, normalize_email};
use crate::errors::AppError;
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::models::cv::CvDocumentRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    pub email: String,
    pub template: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveSectionRequest {
    pub email: String,
    pub section: String,
    pub data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub email: String,
    pub target_role: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvResponse {
    pub email: String,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}

impl From<CvDocumentRow> for CvResponse {
    fn from(row: CvDocumentRow) -> Self {
        Self {
            email: row.email,
            data: row.data,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

pub(crate) fn require_email(raw: &str) -> Result<String, AppError> {
    normalize_email(raw).ok_or_else(|| AppError::Validation("A valid email is required".to_string()))
}

async fn load_document(state: &AppState, email: &str) -> Result<CvDocumentRow, AppError> {
    store::get_cv(&state.db, email)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("No CV found for {email}")))
}

/// POST /api/cv/save-section
pub async fn handle_save_section(
    State(state): State<AppState>,
    Json(req): Json<SaveSectionRequest>,
) -> Result<Json<CvResponse>, AppError> {
    let email = require_email(&req.email)?;
    let section: CvSection = req.section.parse()?;
    section.validate(&req.data)?;

    let row = store::save_section(&state.db, &email, section, &req.data)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(row.into()))
}

/// GET /api/cv/get
pub async fn handle_get_cv(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<CvResponse>, AppError> {
    let email = require_email(&params.email)?;
    let row = load_document(&state, &email).await?;
    Ok(Json(row.into()))
}

/// GET /api/cv/health
///
/// A user without a stored CV gets the report of an empty document.
pub async fn handle_cv_health(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<CompletenessReport>, AppError> {
    let email = require_email(&params.email)?;
    let doc = store::get_cv(&state.db, &email)
        .await
        .map_err(AppError::Internal)?
        .map(|row| CvDocument::from_value(&row.data))
        .unwrap_or_default();
    Ok(Json(compute_completeness_report(&doc)))
}

/// GET /api/cv/render
pub async fn handle_render_cv(
    State(state): State<AppState>,
    Query(params): Query<RenderQuery>,
) -> Result<Json<DocumentDefinition>, AppError> {
    let email = require_email(&params.email)?;
    let template = match params.template.as_deref() {
        Some(t) => t.parse::<CvTemplate>()?,
        None => CvTemplate::default(),
    };
    let row = load_document(&state, &email).await?;
    let doc = CvDocument::from_value(&row.data);
    Ok(Json(render_document(&doc, template)))
}

/// GET /api/cv/export
pub async fn handle_export_markdown(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<impl IntoResponse, AppError> {
    let email = require_email(&params.email)?;
    let row = load_document(&state, &email).await?;
    let md = render_markdown(&CvDocument::from_value(&row.data));
    Ok(([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], md))
}

/// POST /api/cv/summary
///
/// Generates a professional summary from the stored CV. Nothing is persisted;
/// the builder saves it through save-section if the user keeps it.
pub async fn handle_generate_summary(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let email = require_email(&req.email)?;
    let row = load_document(&state, &email).await?;
    let doc = CvDocument::from_value(&row.data);

    if doc.experience.is_empty() && doc.education.is_empty() && doc.skills.is_empty() {
        return Err(AppError::Validation(
            "Add experience, education or skills before generating a summary".to_string(),
        ));
    }

    let target_role_line = req
        .target_role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| format!("Target role: {r}\n"))
        .unwrap_or_default();
    let prompt = SUMMARY_PROMPT
        .replace("{target_role_line}", &target_role_line)
        .replace("{cv_markdown}", &render_markdown(&doc))
        .replace("{grounding}", GROUNDING_INSTRUCTION);

    let summary = state
        .llm
        .call_text(&prompt, SUMMARY_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Summary generation failed: {e}")))?;

    Ok(Json(SummaryResponse { summary }))
}
