use axum::extract::State;
use library_core::{Member, MemberDraft, MemberPatch, MemberProfile, ProfileUpdate};

use crate::error::ApiError;
use crate::extract::{AppJson, AppPath};
use crate::middleware::CurrentUser;
use crate::response::{ApiResponse, Reply};
use crate::state::AppState;

/// GET /api/members/me
pub async fn get_me(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Reply<MemberProfile>, ApiError> {
    let profile = state.members.get_me(&caller).await?;
    Ok(ApiResponse::ok("Profile fetched successfully", profile))
}

/// PATCH /api/members/me
pub async fn update_me(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppJson(update): AppJson<ProfileUpdate>,
) -> Result<Reply<MemberProfile>, ApiError> {
    let profile = state.members.update_me(&caller, update).await?;
    Ok(ApiResponse::ok("Profile updated successfully", profile))
}

pub async fn list_members(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Reply<Vec<Member>>, ApiError> {
    let members = state.members.list(&caller).await?;
    Ok(ApiResponse::ok("Members fetched successfully", members))
}

pub async fn create_member(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppJson(draft): AppJson<MemberDraft>,
) -> Result<Reply<Member>, ApiError> {
    let member = state.members.create(&caller, draft).await?;
    Ok(ApiResponse::created("Member created successfully", member))
}

pub async fn get_member(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Reply<Member>, ApiError> {
    let member = state.members.get_by_id(&caller, id).await?;
    Ok(ApiResponse::ok("Member fetched successfully", member))
}

pub async fn update_member(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<MemberPatch>,
) -> Result<Reply<Member>, ApiError> {
    let member = state.members.update(&caller, id, patch).await?;
    Ok(ApiResponse::ok("Member updated successfully", member))
}

pub async fn delete_member(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Reply<()>, ApiError> {
    state.members.delete(&caller, id).await?;
    Ok(ApiResponse::done("Member deleted successfully"))
}
