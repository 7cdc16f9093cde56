use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cv::handlers::{require_email, EmailQuery};
use crate::errors::AppError;
use crate::models::roadmap::RoadmapRow;
use crate::state::AppState;
use crate::stats::compute::{compute_stats, DashboardStats, RoadmapDocument};
use crate::stats::store;
use crate::stats::streak::parse_activity_date;

#[derive(Debug, Deserialize)]
pub struct LogActivityRequest {
    pub email: String,
    /// Defaults to today (UTC).
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveRoadmapRequest {
    pub email: String,
    pub data: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapResponse {
    pub email: String,
    pub data: Value,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<RoadmapRow> for RoadmapResponse {
    fn from(row: RoadmapRow) -> Self {
        Self {
            email: row.email,
            data: row.data,
            updated_at: Some(row.updated_at),
        }
    }
}

/// GET /api/stats
///
/// A user without a roadmap gets the statistics of an empty document.
pub async fn handle_get_stats(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<DashboardStats>, AppError> {
    let email = require_email(&params.email)?;
    let doc = store::get_roadmap(&state.db, &email)
        .await
        .map_err(AppError::Internal)?
        .map(|row| RoadmapDocument::from_value(&row.data))
        .unwrap_or_default();

    let today = Utc::now().date_naive();
    Ok(Json(compute_stats(&doc, today)))
}

/// POST /api/stats/activity
pub async fn handle_log_activity(
    State(state): State<AppState>,
    Json(req): Json<LogActivityRequest>,
) -> Result<Json<DashboardStats>, AppError> {
    let email = require_email(&req.email)?;
    let today = Utc::now().date_naive();
    let day: NaiveDate = match req.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => parse_activity_date(raw)
            .ok_or_else(|| AppError::Validation(format!("Invalid activity date '{raw}'")))?,
        None => today,
    };

    let row = store::append_activity(&state.db, &email, day)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(compute_stats(
        &RoadmapDocument::from_value(&row.data),
        today,
    )))
}

/// GET /api/roadmap
pub async fn handle_get_roadmap(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<RoadmapResponse>, AppError> {
    let email = require_email(&params.email)?;
    let response = match store::get_roadmap(&state.db, &email)
        .await
        .map_err(AppError::Internal)?
    {
        Some(row) => row.into(),
        None => RoadmapResponse {
            email,
            data: json!({}),
            updated_at: None,
        },
    };
    Ok(Json(response))
}

/// POST /api/roadmap
pub async fn handle_save_roadmap(
    State(state): State<AppState>,
    Json(req): Json<SaveRoadmapRequest>,
) -> Result<Json<RoadmapResponse>, AppError> {
    let email = require_email(&req.email)?;
    if !req.data.is_object() {
        return Err(AppError::Validation(
            "Roadmap data must be a JSON object".to_string(),
        ));
    }
    let row = store::save_roadmap(&state.db, &email, &req.data)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(row.into()))
}
