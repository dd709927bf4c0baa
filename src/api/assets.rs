use axum::{
    body::Body,
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

use super::error::ErrorPage;

#[derive(RustEmbed)]
#[folder = "public"]
struct Asset;

/// GET /static/{*path}
pub async fn serve_asset(Path(path): Path<String>) -> Response {
    match Asset::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, mime.as_ref()),
                    (header::CACHE_CONTROL, "public, max-age=3600"),
                ],
                Body::from(content.data),
            )
                .into_response()
        }
        None => not_found().await,
    }
}

/// Fallback for every unknown route.
pub async fn not_found() -> Response {
    ErrorPage::MissingRoute.respond(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_assets_present() {
        assert!(Asset::get("css/style.css").is_some());
        assert!(Asset::get("js/script.js").is_some());
    }
}
