//! HTTP handlers for the `/media` endpoints.
//! Each handler makes at most one provider call through `StorageService`
//! and returns its record as JSON.

use crate::{
    errors::AppError,
    models::{
        grant::{DownloadGrant, UploadGrant, UploadUrlRequest},
        object::{DeletionReceipt, ObjectListing},
    },
    services::storage_service::StorageService,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

/// POST `/media/upload-url` — sign a PUT for a newly generated key.
pub async fn upload_url(
    State(service): State<StorageService>,
    payload: Result<Json<UploadUrlRequest>, JsonRejection>,
) -> Result<Json<UploadGrant>, AppError> {
    let Json(req) = payload?;
    let grant = service
        .upload_grant(&req.filename, &req.content_type)
        .await?;
    Ok(Json(grant))
}

/// GET `/media/download-url/{*key}` — sign a GET for an existing key.
pub async fn download_url(
    State(service): State<StorageService>,
    key: Result<Path<String>, PathRejection>,
) -> Result<Json<DownloadGrant>, AppError> {
    let Path(key) = key?;
    Ok(Json(service.download_grant(&key).await?))
}

/// GET `/media/download-url/` — the wildcard never matches an empty key.
pub async fn download_url_missing_key(
    State(service): State<StorageService>,
) -> Result<Json<DownloadGrant>, AppError> {
    Ok(Json(service.download_grant("").await?))
}

/// GET `/media/files` — one provider page of objects.
pub async fn list_files(
    State(service): State<StorageService>,
) -> Result<Json<ObjectListing>, AppError> {
    Ok(Json(service.list_objects().await?))
}

/// DELETE `/media/files/{*key}`
pub async fn delete_file(
    State(service): State<StorageService>,
    key: Result<Path<String>, PathRejection>,
) -> Result<Json<DeletionReceipt>, AppError> {
    let Path(key) = key?;
    Ok(Json(service.delete_object(&key).await?))
}

/// DELETE `/media/files/`
pub async fn delete_file_missing_key(
    State(service): State<StorageService>,
) -> Result<Json<DeletionReceipt>, AppError> {
    Ok(Json(service.delete_object("").await?))
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::not_found("Not found")
}

/// Fallback for known routes hit with an unsupported method.
pub async fn method_not_allowed() -> AppError {
    AppError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
