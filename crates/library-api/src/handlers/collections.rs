// ============================================================================
// Library API - Collection Handlers
// File: crates/library-api/src/handlers/collections.rs
// ============================================================================

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use library_core::{Collection, CollectionDetail};
use tracing::info;

use crate::dto::CollectionForm;
use crate::error::ApiError;
use crate::extract::AppPath;
use crate::middleware::CurrentUser;
use crate::response::{ApiResponse, Reply};
use crate::state::AppState;

/// GET /api/collections (public, newest first)
pub async fn list_collections(State(state): State<AppState>) -> Result<Reply<Vec<CollectionDetail>>, ApiError> {
    let collections = state.collections.list().await?;
    Ok(ApiResponse::ok("Collections fetched successfully", collections))
}

pub async fn get_collection(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Reply<CollectionDetail>, ApiError> {
    let collection = state.collections.get_by_id(id).await?;
    Ok(ApiResponse::ok("Collection fetched successfully", collection))
}

/// POST /api/collections (multipart, optional `cover` file)
pub async fn create_collection(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Reply<Collection>, ApiError> {
    let form = CollectionForm::read(multipart?).await?;
    let draft = form.to_draft()?;
    info!(has_cover = form.cover.is_some(), "Creating collection");

    let collection = state.collections.create(&caller, draft, form.cover).await?;
    Ok(ApiResponse::created("Collection created successfully", collection))
}

/// PATCH /api/collections/{id}
pub async fn update_collection(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Reply<CollectionDetail>, ApiError> {
    let form = CollectionForm::read(multipart?).await?;
    let patch = form.to_patch()?;

    let collection = state.collections.update(&caller, id, patch, form.cover).await?;
    Ok(ApiResponse::ok("Collection updated successfully", collection))
}

pub async fn delete_collection(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Reply<()>, ApiError> {
    state.collections.delete(&caller, id).await?;
    Ok(ApiResponse::done("Collection deleted successfully"))
}
