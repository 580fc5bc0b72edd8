//! Guest book handlers

use axum::{extract::State, http::StatusCode, Json};
use library_core::domain::ExternalIdentity;
use library_core::{GuestLog, GuestStats};
use library_shared::Pagination;
use serde::Serialize;
use validator::Validate;

use crate::dto::{CheckInRequest, PageQuery};
use crate::error::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::CurrentUser;
use crate::response::{ApiResponse, Reply};
use crate::state::AppState;

/// GET /api/guests?page=&limit=
pub async fn list_guests(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Reply<Vec<GuestLog>>, ApiError> {
    let pagination = Pagination::from_query(query.page, query.limit);
    let page = state.guests.list(&caller, pagination).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::paged("Guest logs fetched successfully", page.logs, page.meta)),
    ))
}

/// POST /api/guests: 201 on check-in, 409 with the existing log when the
/// guest already visited today.
pub async fn check_in(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CheckInRequest>,
) -> Result<Reply<GuestLog>, ApiError> {
    payload.validate()?;
    let log = state.guests.check_in(&caller, &payload.email).await?;
    Ok(ApiResponse::created("Guest checked in successfully", log))
}

/// Directory row as the dashboard's guest picker reads it.
#[derive(Debug, Serialize)]
pub struct CampusPerson {
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub nim: Option<String>,
    pub nidn: Option<String>,
    pub faculty: Option<String>,
    pub prodi: Option<String>,
}

impl From<ExternalIdentity> for CampusPerson {
    fn from(identity: ExternalIdentity) -> Self {
        Self {
            full_name: identity.display_name().to_string(),
            email: identity.email.trim().to_string(),
            role: identity.role,
            nim: identity.nim,
            nidn: identity.nidn,
            faculty: identity.faculty,
            prodi: identity.major,
        }
    }
}

/// GET /api/guests/campus
pub async fn campus_directory(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Reply<Vec<CampusPerson>>, ApiError> {
    let people = state.guests.campus_directory(&caller).await?;
    Ok(ApiResponse::ok(
        "Campus users fetched successfully",
        people.into_iter().map(CampusPerson::from).collect(),
    ))
}

pub async fn guest_stats(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Reply<GuestStats>, ApiError> {
    let stats = state.guests.stats(&caller).await?;
    Ok(ApiResponse::ok("Guest statistics fetched successfully", stats))
}

pub async fn get_guest(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Reply<GuestLog>, ApiError> {
    let log = state.guests.get_by_id(&caller, id).await?;
    Ok(ApiResponse::ok("Guest log fetched successfully", log))
}

pub async fn delete_guest(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Reply<()>, ApiError> {
    state.guests.delete(&caller, id).await?;
    Ok(ApiResponse::done("Guest log deleted successfully"))
}
