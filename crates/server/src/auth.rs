//! Request identity.
//!
//! Credential issuance lives outside this system; the server only verifies
//! an HS256 JWT already held by the client and extracts `{id, role}` from
//! its claims. Tokens arrive as `Authorization: Bearer <token>` with an
//! `auth_token` cookie fallback.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, StatusCode};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::JsonApiError;
use service::media::MediaStorage;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub media: Arc<dyn MediaStorage>,
    /// Directory uploaded media is served from.
    pub upload_dir: String,
    /// URL prefix the media storage mints, mounted as a static route.
    pub media_prefix: String,
    /// Validity window granted to listings at creation and renewal.
    pub listing_ttl_minutes: i64,
}

/// Authenticated caller identity derived from verified JWT claims.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[allow(dead_code)]
    sub: Option<String>,
    uid: String,
    role: Option<String>,
    #[allow(dead_code)]
    exp: usize,
}

/// Authorization header first, `auth_token` cookie as fallback.
fn token_from_parts(parts: &Parts) -> Option<String> {
    if let Some(h) = parts.headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return h.strip_prefix("Bearer ").map(str::to_string);
    }
    let cookie_header = parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    for part in cookie_header.split(';') {
        if let Some(rest) = part.trim().strip_prefix("auth_token=") {
            if !rest.is_empty() {
                return Some(rest.to_string());
            }
        }
    }
    None
}

fn verify(token: &str, state: &ServerState) -> Result<CurrentUser, JsonApiError> {
    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        warn!(error = %e, "token validation failed");
        JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("invalid or expired token".into()))
    })?;
    let id = Uuid::parse_str(&data.claims.uid).map_err(|_| {
        JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("malformed identity claim".into()))
    })?;
    Ok(CurrentUser { id, role: data.claims.role.unwrap_or_else(|| "user".to_string()) })
}

#[async_trait]
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or_else(|| {
            JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("no token provided".into()))
        })?;
        verify(&token, state)
    }
}

/// Identity if a valid token is present, `None` otherwise. Never rejects.
pub struct OptionalUser(pub Option<CurrentUser>);

#[async_trait]
impl FromRequestParts<ServerState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let user = token_from_parts(parts).and_then(|t| verify(&t, state).ok());
        Ok(OptionalUser(user))
    }
}

/// Authenticated caller that additionally holds the admin role.
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<ServerState> for AdminUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(JsonApiError::new(
                StatusCode::FORBIDDEN,
                "Forbidden",
                Some("insufficient permissions".into()),
            ));
        }
        Ok(AdminUser(user))
    }
}
