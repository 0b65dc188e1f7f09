use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use kiji::config::Config;
use kiji::services::Claims;
use tower::ServiceExt;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password";
const JWT_SECRET: &str = "integration-test-secret";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = 1;
    config.database.min_connections = 1;
    config.auth.jwt_secret = JWT_SECRET.to_string();

    let state = kiji::api::create_app_state(config)
        .await
        .expect("Failed to create app state");
    kiji::api::router(state)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref());

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({"username": username, "password": password}),
        ))
        .await
        .unwrap()
}

/// Sign a token the way the server does, with a caller-chosen time window.
fn forge_token(secret: &str, user_id: i32, issued_hours_ago: i64, ttl_hours: i64) -> String {
    let issued = chrono::Utc::now() - chrono::Duration::hours(issued_hours_ago);
    let claims = Claims {
        sub: user_id,
        iat: issued.timestamp(),
        exp: (issued + chrono::Duration::hours(ttl_hours)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_login_requires_exact_credentials() {
    let app = spawn_app().await;

    // Unknown username and wrong password produce the same generic error
    let response = login(&app, "nobody", ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = json_body(response).await;

    let response = login(&app, ADMIN_USERNAME, "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = json_body(response).await;

    assert_eq!(unknown_user["error"], wrong_password["error"]);
    assert_eq!(unknown_user["error"], "Invalid credentials");

    let response = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["username"], ADMIN_USERNAME);
}

#[tokio::test]
async fn test_token_older_than_ttl_is_rejected() {
    let app = spawn_app().await;

    // Issued 25 hours ago with the default 24h lifetime: expired
    let stale = forge_token(JWT_SECRET, 1, 25, 24);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/categories",
            Some(&stale),
            serde_json::json!({"name": "Rust"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Same shape, still inside the window: accepted
    let fresh = forge_token(JWT_SECRET, 1, 1, 24);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/categories",
            Some(&fresh),
            serde_json::json!({"name": "Rust"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_token_with_wrong_secret_is_rejected() {
    let app = spawn_app().await;

    let bad = forge_token("some-other-secret", 1, 0, 24);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/categories",
            Some(&bad),
            serde_json::json!({"name": "Rust"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_flow() {
    let app = spawn_app().await;

    let response = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let body = json_body(response).await;
    let token = body["token"].as_str().unwrap().to_string();

    // Wrong old password is refused
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/admin/change-password",
            Some(&token),
            serde_json::json!({"oldPassword": "wrong", "newPassword": "swordfish"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/admin/change-password",
            Some(&token),
            serde_json::json!({"oldPassword": ADMIN_PASSWORD, "newPassword": "swordfish"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Old password no longer works, the new one does
    let response = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = login(&app, ADMIN_USERNAME, "swordfish").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_then_login() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            serde_json::json!({"username": "writer", "password": "notebook", "email": "w@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["username"], "writer");
    assert_eq!(body["email"], "w@example.com");

    let response = login(&app, "writer", "notebook").await;
    assert_eq!(response.status(), StatusCode::OK);

    // Usernames are unique
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            serde_json::json!({"username": "writer", "password": "other"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_login_body() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
