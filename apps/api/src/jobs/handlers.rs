use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::cv::handlers::{require_email, EmailQuery};
use crate::errors::AppError;
use crate::jobs::board::{board_summary, build_board, ApplicationCard, BoardColumn, BoardSummary};
use crate::jobs::store::{self, ApplicationPatch, NewApplication};
use crate::jobs::{Priority, Stage};
use crate::state::AppState;
use crate::stats::streak::parse_activity_date;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub email: String,
    pub company: String,
    pub position: String,
    pub stage: Option<String>,
    pub priority: Option<String>,
    pub job_id: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub applied_at: Option<String>,
}

/// Distinguishes a field sent as `null` (`Some(None)`) from one left out.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Absent fields are kept. `null` or a blank string clears an optional field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationRequest {
    pub company: Option<String>,
    pub position: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub job_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub applied_at: Option<Option<String>>,
}

impl UpdateApplicationRequest {
    fn into_patch(self) -> Result<ApplicationPatch, AppError> {
        Ok(ApplicationPatch {
            company: self
                .company
                .as_deref()
                .map(|c| required_text(c, "company"))
                .transpose()?,
            position: self
                .position
                .as_deref()
                .map(|p| required_text(p, "position"))
                .transpose()?,
            priority: self
                .priority
                .as_deref()
                .map(str::parse::<Priority>)
                .transpose()?,
            job_id: self.job_id.map(optional_text),
            location: self.location.map(optional_text),
            notes: self.notes.map(optional_text),
            applied_at: self
                .applied_at
                .map(|raw| parse_applied_at(raw.as_deref()))
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStageRequest {
    pub stage: String,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub columns: Vec<BoardColumn>,
    pub summary: BoardSummary,
}

fn required_text(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_applied_at(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => parse_activity_date(r)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Invalid appliedAt date '{r}'"))),
        None => Ok(None),
    }
}

/// GET /api/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<BoardResponse>, AppError> {
    let email = require_email(&params.email)?;
    let rows = store::list_applications(&state.db, &email)
        .await
        .map_err(AppError::Internal)?;
    let columns = build_board(rows);
    let summary = board_summary(&columns);
    Ok(Json(BoardResponse { columns, summary }))
}

/// POST /api/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationCard>), AppError> {
    let email = require_email(&req.email)?;
    let app = NewApplication {
        company: required_text(&req.company, "company")?,
        position: required_text(&req.position, "position")?,
        stage: req
            .stage
            .as_deref()
            .map(str::parse::<Stage>)
            .transpose()?
            .unwrap_or(Stage::Submitted),
        priority: req
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?
            .unwrap_or_default(),
        job_id: optional_text(req.job_id),
        location: optional_text(req.location),
        notes: optional_text(req.notes),
        applied_at: parse_applied_at(req.applied_at.as_deref())?,
    };

    let row = store::create_application(&state.db, &email, &app)
        .await
        .map_err(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// PATCH /api/applications/:id?email=
pub async fn handle_update_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<EmailQuery>,
    Json(req): Json<UpdateApplicationRequest>,
) -> Result<Json<ApplicationCard>, AppError> {
    let email = require_email(&params.email)?;
    let patch = req.into_patch()?;

    let row = store::update_application(&state.db, id, &email, &patch)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;
    Ok(Json(row.into()))
}

/// PATCH /api/applications/:id/stage?email=
pub async fn handle_update_stage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<EmailQuery>,
    Json(req): Json<UpdateStageRequest>,
) -> Result<Json<ApplicationCard>, AppError> {
    let email = require_email(&params.email)?;
    let stage: Stage = req.stage.parse()?;
    let row = store::update_stage(&state.db, id, &email, stage)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;
    Ok(Json(row.into()))
}

/// DELETE /api/applications/:id?email=
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<EmailQuery>,
) -> Result<StatusCode, AppError> {
    let email = require_email(&params.email)?;
    if store::delete_application(&state.db, id, &email)
        .await
        .map_err(AppError::Internal)?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Application {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_applied_at() {
        assert_eq!(parse_applied_at(None).unwrap(), None);
        assert_eq!(parse_applied_at(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_applied_at(Some("2024-03-01")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert!(parse_applied_at(Some("March 1st")).is_err());
    }

    #[test]
    fn test_patch_distinguishes_cleared_from_absent() {
        let req: UpdateApplicationRequest = serde_json::from_value(serde_json::json!({
            "notes": "",
            "location": null,
            "appliedAt": null,
            "priority": "high"
        }))
        .unwrap();
        assert_eq!(
            req.into_patch().unwrap(),
            ApplicationPatch {
                priority: Some(Priority::High),
                location: Some(None),
                notes: Some(None),
                applied_at: Some(None),
                ..Default::default()
            }
        );

        let req: UpdateApplicationRequest = serde_json::from_value(serde_json::json!({
            "jobId": " JR-42 ",
            "appliedAt": "2024-03-01"
        }))
        .unwrap();
        let patch = req.into_patch().unwrap();
        assert_eq!(patch.job_id, Some(Some("JR-42".to_string())));
        assert_eq!(patch.applied_at, Some(NaiveDate::from_ymd_opt(2024, 3, 1)));
        assert_eq!(patch.notes, None);
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(required_text("  Acme ", "company").unwrap(), "Acme");
        assert!(matches!(
            required_text(" ", "company"),
            Err(AppError::Validation(_))
        ));
        assert_eq!(optional_text(Some("   ".to_string())), None);
        assert_eq!(optional_text(Some(" Remote".to_string())).as_deref(), Some("Remote"));
    }
}
