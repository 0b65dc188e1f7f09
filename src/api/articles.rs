use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::{ArticleDto, ArticleListResponse, ArticleSummaryDto};
use super::validation::validate_id;
use super::{ApiError, AppState};
use crate::db::ArticleInput;
use crate::services::AuthenticatedUser;

#[derive(Deserialize)]
pub struct ListArticlesQuery {
    pub page: Option<u64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u64>,
}

#[derive(Deserialize)]
pub struct ArticleRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_true")]
    pub is_markdown: bool,
    #[serde(default)]
    pub category_ids: Vec<i32>,
}

const fn default_true() -> bool {
    true
}

/// GET /api/articles?page=&pageSize=
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(10);

    let result = state.store.list_articles(page, page_size).await?;

    Ok(Json(ArticleListResponse {
        data: result
            .articles
            .into_iter()
            .map(ArticleSummaryDto::from)
            .collect(),
        total: result.total,
        page,
        page_size,
    }))
}

/// GET /api/articles/{id}
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ArticleDto>, ApiError> {
    let id = validate_id("article", id)?;

    let article = state
        .store
        .get_article(id)
        .await?
        .ok_or_else(|| ApiError::article_not_found(id))?;

    Ok(Json(ArticleDto::from(article)))
}

/// POST /api/admin/articles
/// The owner is the authenticated user; any owner in the body is ignored.
pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<ArticleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_article_body(&payload)?;

    let article = state
        .store
        .create_article(ArticleInput {
            title: &payload.title,
            content: &payload.content,
            is_markdown: payload.is_markdown,
            user_id: user.id,
            category_ids: &payload.category_ids,
        })
        .await?;

    tracing::debug!("Created article {} for user {}", article.article.id, user.id);

    Ok((StatusCode::CREATED, Json(ArticleDto::from(article))))
}

/// PUT /api/admin/articles/{id}
pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(payload): Json<ArticleRequest>,
) -> Result<Json<ArticleDto>, ApiError> {
    let id = validate_id("article", id)?;
    validate_article_body(&payload)?;

    let article = state
        .store
        .update_article(
            id,
            ArticleInput {
                title: &payload.title,
                content: &payload.content,
                is_markdown: payload.is_markdown,
                user_id: user.id,
                category_ids: &payload.category_ids,
            },
        )
        .await?
        .ok_or_else(|| ApiError::article_not_found(id))?;

    Ok(Json(ArticleDto::from(article)))
}

/// DELETE /api/admin/articles/{id}
pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id("article", id)?;

    let deleted = state.store.delete_article(id).await?;
    if !deleted {
        return Err(ApiError::article_not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn validate_article_body(payload: &ArticleRequest) -> Result<(), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if payload.content.trim().is_empty() {
        return Err(ApiError::validation("Content is required"));
    }
    Ok(())
}
