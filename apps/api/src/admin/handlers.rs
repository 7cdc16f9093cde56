use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::admin::{OrgAction, OrgStatus};
use crate::auth::{decode_claims, BearerToken};
use crate::backend_client::validate_path_id;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrganizationsQuery {
    pub status: Option<String>,
}

/// Rejects tokens that are unreadable, expired, or carry a non-admin role.
/// A token without a role claim is left for the backend to judge.
pub fn authorize_admin(token: &str) -> Result<(), AppError> {
    let claims = decode_claims(token)?;
    if claims.is_expired(Utc::now().timestamp()) {
        return Err(AppError::Unauthorized("Token has expired".to_string()));
    }
    if claims.role.is_some() && !claims.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// GET /api/admin/organizations
pub async fn handle_list_organizations(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Query(params): Query<OrganizationsQuery>,
) -> Result<Json<Value>, AppError> {
    authorize_admin(&token)?;
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<OrgStatus>)
        .transpose()?;

    let orgs: Value = match status {
        Some(status) => {
            state
                .java
                .get_json_with_query(
                    "api/admin/organizations",
                    &[("status", status.as_str())],
                    Some(&token),
                )
                .await?
        }
        None => {
            state
                .java
                .get_json("api/admin/organizations", Some(&token))
                .await?
        }
    };
    Ok(Json(orgs))
}

async fn moderate(
    state: &AppState,
    token: &str,
    id: &str,
    action: OrgAction,
) -> Result<Json<Value>, AppError> {
    authorize_admin(token)?;
    let id = validate_path_id(id, "organization id")?;
    let result: Value = state
        .java
        .post_json(
            &format!("api/admin/organizations/{id}/{action}"),
            &json!({}),
            Some(token),
        )
        .await?;
    info!("Organization {id}: {action}");
    Ok(Json(result))
}

/// POST /api/admin/organizations/:id/approve
pub async fn handle_approve_organization(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    moderate(&state, &token, &id, OrgAction::Approve).await
}

/// POST /api/admin/organizations/:id/ban
pub async fn handle_ban_organization(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    moderate(&state, &token, &id, OrgAction::Ban).await
}

/// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<Value>, AppError> {
    let profile: Value = state.java.get_json("api/profile", Some(&token)).await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(payload: Value) -> String {
        encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(b"backend-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_admin_role_passes() {
        let t = token(json!({"sub": "1", "role": "ROLE_ADMIN"}));
        assert!(authorize_admin(&t).is_ok());
    }

    #[test]
    fn test_missing_role_is_deferred_to_backend() {
        let t = token(json!({"sub": "1"}));
        assert!(authorize_admin(&t).is_ok());
    }

    #[test]
    fn test_non_admin_is_forbidden() {
        let t = token(json!({"sub": "1", "role": "student"}));
        assert!(matches!(authorize_admin(&t), Err(AppError::Forbidden)));
    }

    #[test]
    fn test_expired_and_malformed_tokens() {
        let t = token(json!({"sub": "1", "role": "admin", "exp": 1_000}));
        assert!(matches!(authorize_admin(&t), Err(AppError::Unauthorized(_))));
        assert!(matches!(
            authorize_admin("not.a.jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
