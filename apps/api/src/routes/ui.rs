use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /
/// Serves the single-page UI. All behaviour lives in the page's script,
/// which talks to `/api/jobs` and `/api/analyze`.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
