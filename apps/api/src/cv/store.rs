use anyhow::Result;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::info;

use crate::cv::sections::CvSection;
use crate::models::cv::CvDocumentRow;

/// Writes one section into the user's CV document, creating the document if
/// needed. Other sections are left untouched; the section value is replaced.
pub async fn save_section(
    pool: &PgPool,
    email: &str,
    section: CvSection,
    data: &Value,
) -> Result<CvDocumentRow> {
    let row = sqlx::query_as::<_, CvDocumentRow>(
        r#"
        INSERT INTO cv_documents (email, data)
        VALUES ($1, jsonb_build_object($2::text, $3::jsonb))
        ON CONFLICT (email) DO UPDATE
            SET data = cv_documents.data || jsonb_build_object($2::text, $3::jsonb),
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(section.key())
    .bind(data)
    .fetch_one(pool)
    .await?;

    info!("Saved CV section {section} for {email}");
    Ok(row)
}

/// Writes several sections at once (used by the LinkedIn import). The stored
/// document is locked, merged with [`merge_import`] and written back in one
/// transaction.
pub async fn save_sections(
    pool: &PgPool,
    email: &str,
    sections: &[(CvSection, Value)],
) -> Result<CvDocumentRow> {
    let mut tx = pool.begin().await?;

    let existing: Option<Value> =
        sqlx::query_scalar("SELECT data FROM cv_documents WHERE email = $1 FOR UPDATE")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;
    let data = merge_import(
        &existing.unwrap_or_else(|| Value::Object(Map::new())),
        sections,
    );

    let row = sqlx::query_as::<_, CvDocumentRow>(
        r#"
        INSERT INTO cv_documents (email, data)
        VALUES ($1, $2)
        ON CONFLICT (email) DO UPDATE
            SET data = EXCLUDED.data,
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(&data)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    info!("Saved {} CV sections for {email}", sections.len());
    Ok(row)
}

pub async fn get_cv(pool: &PgPool, email: &str) -> Result<Option<CvDocumentRow>> {
    Ok(
        sqlx::query_as::<_, CvDocumentRow>("SELECT * FROM cv_documents WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?,
    )
}

/// In-memory equivalent of the `||` upsert in [`save_section`]: top-level
/// keys of the patch replace those of the existing document.
pub fn merge_sections(existing: &Value, sections: &[(CvSection, Value)]) -> Value {
    let mut merged = existing.as_object().cloned().unwrap_or_default();
    for (section, data) in sections {
        merged.insert(section.key().to_string(), data.clone());
    }
    Value::Object(merged)
}

/// Like [`merge_sections`], except that personal info keeps stored fields
/// the import does not mention.
pub fn merge_import(existing: &Value, sections: &[(CvSection, Value)]) -> Value {
    let mut merged = merge_sections(existing, sections);
    let key = CvSection::PersonalInfo.key();
    if let (Some(Value::Object(stored)), Some(Value::Object(incoming))) = (
        existing.get(key),
        sections
            .iter()
            .find(|(s, _)| *s == CvSection::PersonalInfo)
            .map(|(_, v)| v),
    ) {
        let mut fields = stored.clone();
        fields.extend(incoming.clone());
        merged[key] = Value::Object(fields);
    }
    merged
}

/// Lowercases and trims an email; rejects blanks and strings without `@`.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    (!local.is_empty() && !domain.is_empty()).then_some(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_saved_section_reads_back_unchanged() {
        let data = json!([
            {"title": "Engineer", "company": "Acme", "startDate": "2021-03", "achievements": ["Shipped v2"]},
            {"company": "Initech", "custom": {"nested": [1, 2, 3]}}
        ]);
        let doc = merge_sections(&json!({}), &[(CvSection::Experience, data.clone())]);
        assert_eq!(doc[CvSection::Experience.key()], data);
    }

    #[test]
    fn test_merge_keeps_other_sections() {
        let existing = json!({
            "personalInfo": {"fullName": "Ada"},
            "skills": {"technical": ["Rust"]}
        });
        let doc = merge_sections(
            &existing,
            &[(CvSection::Skills, json!({"technical": ["Go"], "soft": []}))],
        );
        assert_eq!(doc["personalInfo"], json!({"fullName": "Ada"}));
        assert_eq!(doc["skills"], json!({"technical": ["Go"], "soft": []}));
    }

    #[test]
    fn test_merge_into_non_object_starts_fresh() {
        let doc = merge_sections(&Value::Null, &[(CvSection::Awards, json!([]))]);
        assert_eq!(doc, json!({"awards": []}));
    }

    #[test]
    fn test_import_merges_personal_info_fields() {
        let existing = json!({
            "personalInfo": {
                "fullName": "Ada",
                "website": "https://ada.dev",
                "github": "ada",
                "phone": "+44 1234"
            },
            "experience": [{"title": "Old"}]
        });
        let doc = merge_import(
            &existing,
            &[
                (CvSection::PersonalInfo, json!({"fullName": "Ada Lovelace"})),
                (CvSection::Experience, json!([{"title": "Analyst"}])),
            ],
        );
        assert_eq!(
            doc["personalInfo"],
            json!({
                "fullName": "Ada Lovelace",
                "website": "https://ada.dev",
                "github": "ada",
                "phone": "+44 1234"
            })
        );
        assert_eq!(doc["experience"], json!([{"title": "Analyst"}]));

        let fresh = merge_import(
            &json!({}),
            &[(CvSection::PersonalInfo, json!({"fullName": "Ada"}))],
        );
        assert_eq!(fresh, json!({"personalInfo": {"fullName": "Ada"}}));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Ada@Example.COM "),
            Some("ada@example.com".to_string())
        );
        assert_eq!(normalize_email(""), None);
        assert_eq!(normalize_email("no-at-sign"), None);
        assert_eq!(normalize_email("@example.com"), None);
    }
}
