use axum::{
    body::Body,
    http::{StatusCode, Uri, header},
    response::IntoResponse,
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "web/dist"]
struct Asset;

/// Serves the prebuilt front-end. Bare page names resolve to their .html
/// file and any /articles/* path gets the article shell; the API never
/// reaches this fallback.
pub async fn serve_asset(uri: Uri) -> impl IntoResponse {
    let mut path = uri.path().trim_start_matches('/').to_string();

    if path.is_empty() {
        path = "index.html".to_string();
    }

    if let Some(response) = render(&path) {
        return response;
    }

    // /admin -> admin.html, /login -> login.html, /categories -> categories.html
    if !path.contains('.')
        && let Some(response) = render(&format!("{path}.html"))
    {
        return response;
    }

    // Article permalinks all share one page shell
    if path.starts_with("articles/")
        && let Some(response) = render("articles/index.html")
    {
        return response;
    }

    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}

fn render(path: &str) -> Option<axum::response::Response> {
    Asset::get(path).map(|content| {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        (
            [(header::CONTENT_TYPE, mime.as_ref())],
            Body::from(content.data),
        )
            .into_response()
    })
}
