// ============================================================================
// Library API - Session Gate
// File: crates/library-api/src/middleware/auth.rs
// ============================================================================
//! Resolves the bearer token into a `Caller`.
//!
//! The role comes from the stored user rather than the token, so admin changes
//! and blacklisting take effect on the next request.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use library_core::{Caller, DomainError};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

pub struct CurrentUser(pub Caller);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?;
    Some(token.trim()).filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;

        let claims = state.jwt.validate_access_token(token).map_err(|e| {
            debug!("Rejected access token: {}", e);
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;
        let user_id = claims
            .user_id()
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;

        let user = state
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("User no longer exists".into()))?;

        if user.is_blacklisted() {
            return Err(DomainError::Forbidden("Account is blacklisted".into()).into());
        }

        Ok(CurrentUser(Caller::new(user.id, user.role)))
    }
}
