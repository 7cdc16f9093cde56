use anyhow::Result;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;

use crate::models::roadmap::RoadmapRow;

pub async fn get_roadmap(pool: &PgPool, email: &str) -> Result<Option<RoadmapRow>> {
    Ok(
        sqlx::query_as::<_, RoadmapRow>("SELECT * FROM roadmaps WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?,
    )
}

/// Replaces the whole roadmap document.
pub async fn save_roadmap(pool: &PgPool, email: &str, data: &Value) -> Result<RoadmapRow> {
    let row = sqlx::query_as::<_, RoadmapRow>(
        r#"
        INSERT INTO roadmaps (email, data)
        VALUES ($1, $2)
        ON CONFLICT (email) DO UPDATE
            SET data = EXCLUDED.data,
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(data)
    .fetch_one(pool)
    .await?;

    info!("Saved roadmap for {email}");
    Ok(row)
}

/// Appends one day to `activityLog`, creating the document if needed.
pub async fn append_activity(pool: &PgPool, email: &str, day: NaiveDate) -> Result<RoadmapRow> {
    let day = day.format("%Y-%m-%d").to_string();
    let row = sqlx::query_as::<_, RoadmapRow>(
        r#"
        INSERT INTO roadmaps (email, data)
        VALUES ($1, jsonb_build_object('activityLog', jsonb_build_array($2::text)))
        ON CONFLICT (email) DO UPDATE
            SET data = jsonb_set(
                    roadmaps.data,
                    '{activityLog}',
                    CASE jsonb_typeof(roadmaps.data -> 'activityLog')
                        WHEN 'array' THEN roadmaps.data -> 'activityLog'
                        ELSE '[]'::jsonb
                    END || jsonb_build_array($2::text)
                ),
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(&day)
    .fetch_one(pool)
    .await?;

    info!("Logged activity on {day} for {email}");
    Ok(row)
}
