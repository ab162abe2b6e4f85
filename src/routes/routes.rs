//! Defines routes for the presigned URL API.
//!
//! ## Structure
//! - `GET    /`                          — API banner
//! - `GET    /health`                    — provider connectivity probe
//! - `POST   /media/upload-url`          — sign an upload for a new key
//! - `GET    /media/download-url/{*key}` — sign a download for `key`
//! - `GET    /media/files`               — list one page of objects
//! - `DELETE /media/files/{*key}`        — delete `key`
//!
//! The wildcard `*key` allows nested keys like `uploads/2025-01-01/img.jpg`.
//! It never matches an empty key, so the bare `.../` forms are routed
//! separately and rejected with 400.

use crate::{
    errors::panic_response,
    handlers::{
        health_handlers::{health, root},
        media_handlers::{
            delete_file, delete_file_missing_key, download_url, download_url_missing_key,
            list_files, method_not_allowed, not_found, upload_url,
        },
    },
    services::storage_service::StorageService,
};
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Build and return the router for all API routes.
///
/// The router carries shared state (`StorageService`) to all handlers.
pub fn routes() -> Router<StorageService> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/media/upload-url", post(upload_url))
        .route("/media/download-url/", get(download_url_missing_key))
        .route("/media/download-url/{*key}", get(download_url))
        .route("/media/files", get(list_files))
        .route("/media/files/", delete(delete_file_missing_key))
        .route("/media/files/{*key}", delete(delete_file))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}

/// Full application: routes, state, and the middleware stack.
pub fn app(service: StorageService, cors_origins: &[String]) -> Router {
    routes()
        .with_state(service)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

/// Browser access is limited to the configured origins. Credentials are
/// allowed, so methods and headers are mirrored rather than wildcarded.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
