use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use kiji::config::Config;
use tower::ServiceExt;

/// Admin credentials seeded by the initial migration
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    // A single pooled connection keeps every query on the same in-memory db
    config.database.max_connections = 1;
    config.database.min_connections = 1;
    config.auth.jwt_secret = "integration-test-secret".to_string();

    let state = kiji::api::create_app_state(config)
        .await
        .expect("Failed to create app state");
    kiji::api::router(state)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
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

async fn admin_token(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    body["token"].as_str().unwrap().to_string()
}

async fn create_article(
    app: &Router,
    token: &str,
    title: &str,
    category_ids: &[i32],
) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/articles",
            Some(token),
            serde_json::json!({
                "title": title,
                "content": format!("Body of {title}"),
                "category_ids": category_ids,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

#[tokio::test]
async fn test_empty_article_listing() {
    let app = spawn_app().await;

    let response = app.oneshot(get("/api/articles")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"], serde_json::json!([]));
    assert_eq!(body["total"], 0);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 10);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/categories",
            None,
            serde_json::json!({"name": "Rust"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/categories",
            Some("not-a-real-token"),
            serde_json::json!({"name": "Rust"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_category_crud_and_uniqueness() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/categories",
            Some(&token),
            serde_json::json!({"name": "Rust"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let category_id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "Rust");

    // Second create with the same name fails
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/categories",
            Some(&token),
            serde_json::json!({"name": "Rust"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.clone().oneshot(get("/api/categories")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/admin/categories/{category_id}"),
            Some(&token),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Soft-deleted: gone from the listing, but the name stays reserved
    // because the unique index spans the dead row
    let response = app.clone().oneshot(get("/api/categories")).await.unwrap();
    let body = json_body(response).await;
    assert!(body.as_array().unwrap().is_empty());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/categories",
            Some(&token),
            serde_json::json!({"name": "Rust"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_article_pagination_ranks_and_total() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    for n in 1..=12 {
        create_article(&app, &token, &format!("Article {n}"), &[]).await;
    }

    let response = app
        .clone()
        .oneshot(get("/api/articles?page=2&pageSize=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["total"], 12);
    assert_eq!(body["page"], 2);
    assert_eq!(body["pageSize"], 5);

    // Newest first: page 2 holds ranks 6-10, i.e. articles 7 down to 3
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Article 7",
            "Article 6",
            "Article 5",
            "Article 4",
            "Article 3"
        ]
    );
}

#[tokio::test]
async fn test_article_nested_read_and_soft_delete() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/categories",
            Some(&token),
            serde_json::json!({"name": "Essays"}),
        ))
        .await
        .unwrap();
    let category = json_body(response).await;
    let category_id = i32::try_from(category["id"].as_i64().unwrap()).unwrap();

    let article = create_article(&app, &token, "On Soft Deletes", &[category_id]).await;
    let article_id = article["id"].as_i64().unwrap();
    assert_eq!(article["user"]["username"], ADMIN_USERNAME);
    assert_eq!(article["categories"][0]["name"], "Essays");

    let response = app
        .clone()
        .oneshot(get(&format!("/api/articles/{article_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["title"], "On Soft Deletes");
    assert_eq!(body["comments"], serde_json::json!([]));

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/admin/articles/{article_id}"),
            Some(&token),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone from reads and listings afterwards
    let response = app
        .clone()
        .oneshot(get(&format!("/api/articles/{article_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/api/articles")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_article_update_replaces_category_set() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let mut category_ids = Vec::new();
    for name in ["First", "Second"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/admin/categories",
                Some(&token),
                serde_json::json!({"name": name}),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        category_ids.push(i32::try_from(body["id"].as_i64().unwrap()).unwrap());
    }

    let article = create_article(&app, &token, "Draft", &[category_ids[0]]).await;
    let article_id = article["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/articles/{article_id}"),
            Some(&token),
            serde_json::json!({
                "title": "Draft, revised",
                "content": "New body",
                "category_ids": [category_ids[1]],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["title"], "Draft, revised");
    let names: Vec<&str> = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Second"]);
}

#[tokio::test]
async fn test_comments_are_anonymous() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let article = create_article(&app, &token, "Commented", &[]).await;
    let article_id = article["id"].as_i64().unwrap();

    // A supplied user reference and an empty name are both overridden
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/articles/{article_id}/comments"),
            None,
            serde_json::json!({"content": "First!", "userName": "", "userId": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["user_name"], "Anonymous");
    assert!(body["user_id"].is_null());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/articles/{article_id}/comments"),
            None,
            serde_json::json!({"content": "Nice post", "userName": "Alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Newest first
    let response = app
        .clone()
        .oneshot(get(&format!("/api/articles/{article_id}/comments")))
        .await
        .unwrap();
    let comments = json_body(response).await;
    let comments = comments.as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["user_name"], "Alice");
    assert_eq!(comments[1]["user_name"], "Anonymous");

    // Admin removes a comment; it disappears from the listing
    let comment_id = comments[0]["id"].as_i64().unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/admin/comments/{comment_id}"),
            Some(&token),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/api/articles/{article_id}/comments")))
        .await
        .unwrap();
    let comments = json_body(response).await;
    assert_eq!(comments.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_comment_on_missing_article() {
    let app = spawn_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/articles/999/comments",
            None,
            serde_json::json!({"content": "hello"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_embedded_frontend_pages() {
    let app = spawn_app().await;

    for uri in ["/", "/login", "/admin", "/categories", "/articles/42"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert_eq!(content_type, mime::TEXT_HTML.as_ref(), "GET {uri}");
    }

    let response = app
        .clone()
        .oneshot(get("/static/css/style.css"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/no-such-page.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
