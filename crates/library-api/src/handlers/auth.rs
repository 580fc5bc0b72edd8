// ============================================================================
// Library API - Auth Handlers
// File: crates/library-api/src/handlers/auth.rs
// ============================================================================
//! Campus login callback and user administration

use axum::extract::State;
use library_core::services::LoginOutcome;
use library_core::{User, UserChanges};
use uuid::Uuid;
use validator::Validate;

use crate::dto::LoginRequest;
use crate::error::ApiError;
use crate::extract::{AppJson, AppPath};
use crate::middleware::CurrentUser;
use crate::response::{ApiResponse, Reply};
use crate::state::AppState;

/// POST /api/auth/google-callback
pub async fn google_callback(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Reply<LoginOutcome>, ApiError> {
    payload.validate()?;
    let outcome = state.auth.login_with_campus(&payload.email).await?;
    Ok(ApiResponse::ok("Login successful", outcome))
}

/// GET /api/auth/users
pub async fn list_users(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Reply<Vec<User>>, ApiError> {
    let users = state.auth.list_users(&caller).await?;
    Ok(ApiResponse::ok("Users fetched successfully", users))
}

/// PATCH /api/auth/users/{id}
pub async fn update_user(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(changes): AppJson<UserChanges>,
) -> Result<Reply<User>, ApiError> {
    let user = state.auth.update_user(&caller, &id, changes).await?;
    Ok(ApiResponse::ok("User updated successfully", user))
}
