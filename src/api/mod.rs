use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, JwtAuthService};

mod articles;
mod assets;
pub mod auth;
mod categories;
mod comments;
mod error;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;

    let auth = Arc::new(JwtAuthService::new(
        store.clone(),
        &config.auth.jwt_secret,
        config.auth.token_ttl_hours,
    )) as Arc<dyn AuthService>;

    Ok(Arc::new(AppState {
        config,
        store,
        auth,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let admin_routes = create_admin_router(state.clone());

    let api_router = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/articles", get(articles::list_articles))
        .route("/articles/{id}", get(articles::get_article))
        .route(
            "/articles/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/categories", get(categories::list_categories))
        .nest("/admin", admin_routes)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .fallback(assets::serve_asset)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// Admin surface. The auth layer runs first and injects the user id; the
/// admin layer is the role-check placeholder on top of it.
fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/articles", post(articles::create_article))
        .route("/articles/{id}", put(articles::update_article))
        .route("/articles/{id}", delete(articles::delete_article))
        .route("/categories", post(categories::create_category))
        .route("/categories/{id}", delete(categories::delete_category))
        .route("/comments/{id}", delete(comments::delete_comment))
        .route("/change-password", put(auth::change_password))
        .route_layer(middleware::from_fn(auth::admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
