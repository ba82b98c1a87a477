use axum::{
    http::{Uri, header},
    response::{IntoResponse, Response},
};

use crate::auth;

// Embed static assets at compile time
const STYLE_CSS: &str = include_str!("../../frontend/public/style.css");

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn serve_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], STYLE_CSS)
}

pub async fn index() -> Response {
    auth::redirect(auth::HOME_PATH)
}

pub async fn not_found(uri: Uri) -> crate::AppError {
    crate::AppError::NotFound(uri.path().to_string())
}
