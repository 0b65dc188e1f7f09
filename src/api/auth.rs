use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use super::types::{LoginResponse, UserDto};
use crate::services::AuthenticatedUser;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Bearer-token middleware for admin routes. Verifies signature and expiry
/// and injects the resolved user id into request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer_token(&headers) else {
        return Err(ApiError::Unauthorized("Missing bearer token".to_string()));
    };

    let user = state
        .auth
        .verify_token(&token)
        .await
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Role check placeholder. The deployment model is single-admin, so any
/// authenticated user is treated as an administrator.
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<AuthenticatedUser>().is_none() {
        return Err(ApiError::Unauthorized("Not authenticated".to_string()));
    }

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
/// Authenticate with username and password, returns a signed token on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state.auth.login(&payload.username, &payload.password).await?;

    Ok(Json(LoginResponse {
        token: result.token,
        user: UserDto::from(result.user),
    }))
}

/// POST /api/auth/register
/// Create a local account. Routed, but the shipped front-end never calls it.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .auth
        .register(
            &payload.username,
            &payload.password,
            payload.email.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// PUT /api/admin/change-password
/// Re-validates the old password before storing the new hash.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .auth
        .change_password(user.id, &payload.old_password, &payload.new_password)
        .await?;

    Ok(StatusCode::OK)
}
