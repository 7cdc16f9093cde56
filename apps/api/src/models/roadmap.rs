use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Roadmap document: skills, activity log, goals and skill completions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapRow {
    pub email: String,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}
