use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::jobs::{Priority, Stage};
use crate::models::application::JobApplicationRow;

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    pub stage: Stage,
    pub priority: Priority,
    pub job_id: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub applied_at: Option<NaiveDate>,
}

/// Fields left as `None` keep their stored value. The optional columns use
/// `Some(None)` to clear what is stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationPatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub priority: Option<Priority>,
    pub job_id: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub applied_at: Option<Option<NaiveDate>>,
}

pub async fn create_application(
    pool: &PgPool,
    email: &str,
    app: &NewApplication,
) -> Result<JobApplicationRow> {
    let row = sqlx::query_as::<_, JobApplicationRow>(
        r#"
        INSERT INTO job_applications
            (id, email, company, position, stage, priority, job_id, location, notes, applied_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(&app.company)
    .bind(&app.position)
    .bind(app.stage.as_str())
    .bind(app.priority.as_str())
    .bind(&app.job_id)
    .bind(&app.location)
    .bind(&app.notes)
    .bind(app.applied_at)
    .fetch_one(pool)
    .await?;

    info!("Created application {} for {email}", row.id);
    Ok(row)
}

pub async fn list_applications(pool: &PgPool, email: &str) -> Result<Vec<JobApplicationRow>> {
    Ok(sqlx::query_as::<_, JobApplicationRow>(
        "SELECT * FROM job_applications WHERE email = $1 ORDER BY updated_at DESC",
    )
    .bind(email)
    .fetch_all(pool)
    .await?)
}

pub async fn update_stage(
    pool: &PgPool,
    id: Uuid,
    email: &str,
    stage: Stage,
) -> Result<Option<JobApplicationRow>> {
    let row = sqlx::query_as::<_, JobApplicationRow>(
        r#"
        UPDATE job_applications
        SET stage = $3, updated_at = now()
        WHERE id = $1 AND email = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(stage.as_str())
    .fetch_optional(pool)
    .await?;

    if row.is_some() {
        info!("Moved application {id} to {stage}");
    }
    Ok(row)
}

pub async fn update_application(
    pool: &PgPool,
    id: Uuid,
    email: &str,
    patch: &ApplicationPatch,
) -> Result<Option<JobApplicationRow>> {
    Ok(sqlx::query_as::<_, JobApplicationRow>(
        r#"
        UPDATE job_applications
        SET company    = COALESCE($3, company),
            position   = COALESCE($4, position),
            priority   = COALESCE($5, priority),
            job_id     = CASE WHEN $6 THEN $7 ELSE job_id END,
            location   = CASE WHEN $8 THEN $9 ELSE location END,
            notes      = CASE WHEN $10 THEN $11 ELSE notes END,
            applied_at = CASE WHEN $12 THEN $13 ELSE applied_at END,
            updated_at = now()
        WHERE id = $1 AND email = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(&patch.company)
    .bind(&patch.position)
    .bind(patch.priority.map(Priority::as_str))
    .bind(patch.job_id.is_some())
    .bind(patch.job_id.clone().flatten())
    .bind(patch.location.is_some())
    .bind(patch.location.clone().flatten())
    .bind(patch.notes.is_some())
    .bind(patch.notes.clone().flatten())
    .bind(patch.applied_at.is_some())
    .bind(patch.applied_at.flatten())
    .fetch_optional(pool)
    .await?)
}

/// Returns whether a row was deleted.
pub async fn delete_application(pool: &PgPool, id: Uuid, email: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM job_applications WHERE id = $1 AND email = $2")
        .bind(id)
        .bind(email)
        .execute(pool)
        .await?;
    let deleted = result.rows_affected() > 0;
    if deleted {
        info!("Deleted application {id}");
    }
    Ok(deleted)
}
