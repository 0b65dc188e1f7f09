use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::{CommentDto, MessageResponse};
use super::validation::validate_id;
use super::{ApiError, AppState};
use crate::db::CommentInput;

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    /// Accepted but discarded; every comment is stored anonymously.
    #[serde(rename = "userId", default)]
    pub user_id: Option<i32>,
}

/// GET /api/articles/{id}/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(article_id): Path<i32>,
) -> Result<Json<Vec<CommentDto>>, ApiError> {
    let article_id = validate_id("article", article_id)?;

    let comments = state.store.list_comments_for_article(article_id).await?;
    let dtos: Vec<CommentDto> = comments.into_iter().map(CommentDto::from).collect();
    Ok(Json(dtos))
}

/// POST /api/articles/{id}/comments
/// Anonymous by construction: the stored user reference is always null and
/// an empty display name becomes "Anonymous".
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Path(article_id): Path<i32>,
    headers: HeaderMap,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let article_id = validate_id("article", article_id)?;

    if payload.content.trim().is_empty() {
        return Err(ApiError::validation("Content is required"));
    }

    // Whatever user reference the client claimed is dropped here.
    let _ = payload.user_id;

    if state.store.get_article(article_id).await?.is_none() {
        return Err(ApiError::article_not_found(article_id));
    }

    let ip = client_ip(&headers);

    let comment = state
        .store
        .create_comment(CommentInput {
            article_id,
            content: &payload.content,
            user_name: payload.user_name.as_deref(),
            ip: &ip,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CommentDto::from(comment))))
}

/// DELETE /api/admin/comments/{id}
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = validate_id("comment", id)?;

    let deleted = state.store.delete_comment(id).await?;
    if !deleted {
        return Err(ApiError::not_found("Comment", id));
    }

    Ok(Json(MessageResponse {
        message: "Comment deleted successfully".to_string(),
    }))
}

/// Best-effort client address from the usual reverse-proxy headers.
fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    if let Some(real_ip) = headers.get("X-Real-IP")
        && let Ok(value) = real_ip.to_str()
        && !value.trim().is_empty()
    {
        return value.trim().to_string();
    }

    "unknown".to_string()
}
