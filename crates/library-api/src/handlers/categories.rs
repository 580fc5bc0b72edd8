use axum::extract::State;
use library_core::{Category, CategoryInput};

use crate::error::ApiError;
use crate::extract::{AppJson, AppPath};
use crate::middleware::CurrentUser;
use crate::response::{ApiResponse, Reply};
use crate::state::AppState;

pub async fn list_categories(State(state): State<AppState>) -> Result<Reply<Vec<Category>>, ApiError> {
    let categories = state.categories.list().await?;
    Ok(ApiResponse::ok("Categories fetched successfully", categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Reply<Category>, ApiError> {
    let category = state.categories.get_by_id(id).await?;
    Ok(ApiResponse::ok("Category fetched successfully", category))
}

pub async fn create_category(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CategoryInput>,
) -> Result<Reply<Category>, ApiError> {
    let category = state.categories.create(&caller, input).await?;
    Ok(ApiResponse::created("Category created successfully", category))
}

pub async fn update_category(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(input): AppJson<CategoryInput>,
) -> Result<Reply<Category>, ApiError> {
    let category = state.categories.update(&caller, id, input).await?;
    Ok(ApiResponse::ok("Category updated successfully", category))
}

pub async fn delete_category(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Reply<()>, ApiError> {
    state.categories.delete(&caller, id).await?;
    Ok(ApiResponse::done("Category deleted successfully"))
}
