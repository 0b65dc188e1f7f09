use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::CategoryDto;
use super::validation::validate_id;
use super::{ApiError, AppState};

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryDto>>, ApiError> {
    let categories = state.store.list_categories().await?;
    let dtos: Vec<CategoryDto> = categories.into_iter().map(CategoryDto::from).collect();
    Ok(Json(dtos))
}

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Category name is required"));
    }

    if state.store.category_name_exists(name).await? {
        return Err(ApiError::Conflict(format!(
            "Category '{name}' already exists"
        )));
    }

    let category = state.store.create_category(name).await?;

    Ok((StatusCode::CREATED, Json(CategoryDto::from(category))))
}

/// DELETE /api/admin/categories/{id}
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id("category", id)?;

    let deleted = state.store.delete_category(id).await?;
    if !deleted {
        return Err(ApiError::not_found("Category", id));
    }

    Ok(StatusCode::OK)
}
