//! JWT handling. Tokens are issued by the Java backend, which owns the signing
//! secret; this service only decodes payloads for display and forwards the
//! raw token upstream.

use std::collections::BTreeMap;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub exp: Option<i64>,
    pub iat: Option<i64>,
    /// Anything else the backend put in the payload.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TokenClaims {
    /// A token without `exp` never expires.
    pub fn is_expired(&self, now_ts: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now_ts)
    }

    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("admin") || r.eq_ignore_ascii_case("role_admin"))
    }
}

/// Decodes a JWT payload without verifying its signature.
pub fn decode_claims(token: &str) -> Result<TokenClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Malformed token: {e}")))
}

/// Raw bearer token taken from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

        parse_bearer(header)
            .map(|t| BearerToken(t.to_string()))
            .ok_or_else(|| AppError::Unauthorized("Expected a Bearer token".to_string()))
    }
}

fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub claims: TokenClaims,
    pub expired: bool,
}

/// GET /api/auth/me
pub async fn handle_me(BearerToken(token): BearerToken) -> Result<Json<MeResponse>, AppError> {
    let claims = decode_claims(&token)?;
    let expired = claims.is_expired(Utc::now().timestamp());
    Ok(Json(MeResponse { claims, expired }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn make_token(payload: Value) -> String {
        encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(b"backend-only-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_without_knowing_secret() {
        let token = make_token(json!({
            "sub": "42",
            "email": "ada@example.com",
            "role": "ADMIN",
            "exp": 4_102_444_800i64,
            "orgId": "org-7"
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
        assert_eq!(claims.extra.get("orgId"), Some(&json!("org-7")));
        assert!(claims.is_admin());
        assert!(!claims.is_expired(1_700_000_000));
    }

    #[test]
    fn test_expired_token_still_decodes() {
        let token = make_token(json!({"sub": "1", "exp": 1_000i64}));
        let claims = decode_claims(&token).unwrap();
        assert!(claims.is_expired(2_000));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            decode_claims("not-a-jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(parse_bearer("bearer   tok "), Some("tok"));
        assert_eq!(parse_bearer("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_bearer("Bearer "), None);
    }
}
