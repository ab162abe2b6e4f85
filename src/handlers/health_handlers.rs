//! Root & health handlers.
//!
//! - GET /        -> static API banner
//! - GET /health  -> provider connectivity probe (always 200)

use crate::services::storage_service::StorageService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;

/// `GET /`
///
/// Cheap banner; never touches the provider.
pub async fn root() -> impl IntoResponse {
    Json(ApiInfo {
        message: "Media Processing API".into(),
        status: "running".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// `GET /health`
///
/// Looks up the bucket location as a lightweight provider round-trip. A
/// failed probe is reported in the body as `unhealthy`; the HTTP status is
/// 200 either way because the probe result is the payload.
pub async fn health(State(service): State<StorageService>) -> impl IntoResponse {
    let timestamp = Utc::now().to_rfc3339();

    let body = match service.bucket_location().await {
        Ok(region) => HealthReport {
            status: "healthy".into(),
            message: "API is running and S3 connection is working".into(),
            bucket_region: Some(region),
            timestamp,
        },
        Err(err) => {
            tracing::warn!(bucket = service.bucket(), error = %err, "health probe failed");
            HealthReport {
                status: "unhealthy".into(),
                message: format!("S3 connection failed: {}", err),
                bucket_region: None,
                timestamp,
            }
        }
    };

    (StatusCode::OK, Json(body))
}

#[derive(Serialize)]
struct ApiInfo {
    message: String,
    status: String,
    version: String,
}

#[derive(Serialize)]
struct HealthReport {
    status: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bucket_region: Option<String>,
    timestamp: String,
}
