//! src/services/storage_service.rs
//!
//! StorageService: issues presigned grants and performs listing/deletion
//! against a single bucket. The provider itself sits behind `ObjectBackend`;
//! this layer owns key naming, input validation and response shaping.

use crate::models::{
    grant::{DownloadGrant, UploadGrant},
    object::{DeletionReceipt, ObjectListing, ObjectSummary},
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Provider error codes that mean the addressed object does not exist.
const MISSING_KEY_CODES: [&str; 2] = ["NoSuchKey", "NotFound"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key is required")]
    MissingKey,
    #[error("Filename is required")]
    MissingFilename,
    #[error("invalid presigning configuration: {0}")]
    Presigning(String),
    #[error("{operation} failed: {message}")]
    Provider {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
}

impl StorageError {
    pub fn provider(
        operation: &'static str,
        code: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            operation,
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// True when the provider said the target object is absent.
    ///
    /// Best effort: many provider calls never report a code, in which case
    /// this is false and the failure is treated as a server error.
    pub fn is_missing_object(&self) -> bool {
        matches!(
            self,
            Self::Provider { code: Some(code), .. } if MISSING_KEY_CODES.contains(&code.as_str())
        )
    }

    /// True for failures caused by the caller's input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::MissingKey | Self::MissingFilename)
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// The four provider calls this service needs, plus a liveness probe.
///
/// Each method maps onto exactly one provider request; implementations must
/// not retry.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Sign a PUT for `key` restricted to `content_type`.
    async fn presign_put(&self, key: &str, content_type: &str, ttl: Duration)
    -> StorageResult<String>;

    /// Sign a GET for `key`.
    async fn presign_get(&self, key: &str, ttl: Duration) -> StorageResult<String>;

    /// Return the provider's first page of objects, in provider order.
    async fn list_objects(&self) -> StorageResult<Vec<ObjectSummary>>;

    async fn delete_object(&self, key: &str) -> StorageResult<()>;

    /// Region reported for the configured bucket.
    async fn bucket_location(&self) -> StorageResult<String>;
}

/// Shared, cheaply cloneable handle passed to every handler as axum state.
///
/// Holds no mutable state; the configuration is fixed at construction.
#[derive(Clone)]
pub struct StorageService {
    backend: Arc<dyn ObjectBackend>,
    bucket: String,
    expires_in: u64,
}

impl StorageService {
    pub fn new(backend: Arc<dyn ObjectBackend>, bucket: impl Into<String>, expires_in: u64) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
            expires_in,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }

    /// Build `uploads/{YYYY-MM-DD}/{uuid}-{filename}` for the given date.
    ///
    /// The random token keeps concurrent uploads of the same filename apart.
    pub fn upload_key(date: NaiveDate, token: Uuid, filename: &str) -> String {
        format!("uploads/{}/{}-{}", date.format("%Y-%m-%d"), token, filename)
    }

    /// Issue a write-only grant for a newly generated key.
    pub async fn upload_grant(&self, filename: &str, content_type: &str) -> StorageResult<UploadGrant> {
        if filename.trim().is_empty() {
            return Err(StorageError::MissingFilename);
        }

        let key = Self::upload_key(Utc::now().date_naive(), Uuid::new_v4(), filename);
        debug!(%key, content_type, "signing upload URL");

        let upload_url = self
            .backend
            .presign_put(&key, content_type, self.ttl())
            .await
            .inspect_err(|err| warn!(%key, error = %err, "upload URL signing failed"))?;

        Ok(UploadGrant {
            upload_url,
            key,
            expires_in: self.expires_in,
        })
    }

    /// Issue a read-only grant for `key`. The key is echoed unchanged.
    pub async fn download_grant(&self, key: &str) -> StorageResult<DownloadGrant> {
        ensure_key_present(key)?;
        debug!(key, "signing download URL");

        let download_url = self
            .backend
            .presign_get(key, self.ttl())
            .await
            .inspect_err(|err| warn!(key, error = %err, "download URL signing failed"))?;

        Ok(DownloadGrant {
            download_url,
            key: key.to_string(),
            expires_in: self.expires_in,
        })
    }

    /// List one provider page. Larger buckets are truncated.
    pub async fn list_objects(&self) -> StorageResult<ObjectListing> {
        let objects = self
            .backend
            .list_objects()
            .await
            .inspect_err(|err| warn!(bucket = %self.bucket, error = %err, "listing failed"))?;
        debug!(count = objects.len(), "listed objects");
        Ok(ObjectListing::from(objects))
    }

    /// Delete `key`. Succeeds whether or not the key existed.
    pub async fn delete_object(&self, key: &str) -> StorageResult<DeletionReceipt> {
        ensure_key_present(key)?;

        self.backend
            .delete_object(key)
            .await
            .inspect_err(|err| warn!(key, error = %err, "delete failed"))?;

        debug!(key, "deleted object");
        Ok(DeletionReceipt::new(key))
    }

    pub async fn bucket_location(&self) -> StorageResult<String> {
        self.backend.bucket_location().await
    }
}

/// Only the empty key is refused; whitespace is a legal key byte.
fn ensure_key_present(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::MissingKey);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fake_backend::FakeBackend;

    fn service(backend: Arc<FakeBackend>) -> StorageService {
        StorageService::new(backend, "media-bucket", 3600)
    }

    #[test]
    fn test_upload_key_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).expect("valid date");
        let token = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").expect("valid uuid");

        assert_eq!(
            StorageService::upload_key(date, token, "cat.png"),
            "uploads/2024-01-05/550e8400-e29b-41d4-a716-446655440000-cat.png"
        );
    }

    #[tokio::test]
    async fn test_upload_grant_generates_dated_unique_keys() {
        let backend = Arc::new(FakeBackend::default());
        let svc = service(backend.clone());
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

        let first = svc.upload_grant("cat.png", "image/png").await.expect("grant");
        let second = svc.upload_grant("cat.png", "image/png").await.expect("grant");

        assert!(first.key.starts_with(&format!("uploads/{}/", today)));
        assert!(first.key.ends_with("-cat.png"));
        assert_ne!(first.key, second.key);
        assert_eq!(first.expires_in, 3600);
        assert!(first.upload_url.contains(&first.key));
        assert!(first.upload_url.contains("image/png"));
    }

    #[tokio::test]
    async fn test_upload_grant_rejects_blank_filename() {
        let backend = Arc::new(FakeBackend::default());
        let err = service(backend.clone())
            .upload_grant("   ", "image/png")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::MissingFilename));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_download_grant_echoes_nested_key() {
        let backend = Arc::new(FakeBackend::default());
        let key = "uploads/2024-01-01/abc-report.pdf";

        let grant = service(backend).download_grant(key).await.expect("grant");
        assert_eq!(grant.key, key);
        assert!(grant.download_url.contains(key));
    }

    #[tokio::test]
    async fn test_empty_key_never_reaches_provider() {
        let backend = Arc::new(FakeBackend::default());
        let svc = service(backend.clone());

        assert!(matches!(
            svc.download_grant("").await.unwrap_err(),
            StorageError::MissingKey
        ));
        assert!(matches!(
            svc.delete_object("").await.unwrap_err(),
            StorageError::MissingKey
        ));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_key_is_a_real_key() {
        let backend = Arc::new(FakeBackend::with_objects(&[" "]));
        let svc = service(backend.clone());

        let grant = svc.download_grant(" ").await.expect("grant");
        assert_eq!(grant.key, " ");
        let receipt = svc.delete_object(" ").await.expect("delete");
        assert_eq!(receipt.key, " ");
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_list_counts_objects_in_provider_order() {
        let backend = Arc::new(FakeBackend::with_objects(&["b.txt", "a.txt", "c/d.txt"]));

        let listing = service(backend).list_objects().await.expect("listing");
        let keys: Vec<_> = listing.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["b.txt", "a.txt", "c/d.txt"]);
        assert_eq!(listing.count, 3);
    }

    #[tokio::test]
    async fn test_list_empty_bucket_is_not_an_error() {
        let listing = service(Arc::new(FakeBackend::default()))
            .list_objects()
            .await
            .expect("listing");
        assert!(listing.objects.is_empty());
        assert_eq!(listing.count, 0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = Arc::new(FakeBackend::with_objects(&["a.txt"]));
        let svc = service(backend);

        let first = svc.delete_object("a.txt").await.expect("delete");
        let second = svc.delete_object("a.txt").await.expect("delete again");
        assert_eq!(first.message, "Object deleted successfully");
        assert_eq!(second.key, "a.txt");
    }

    #[tokio::test]
    async fn test_provider_failure_is_propagated() {
        let backend = Arc::new(FakeBackend::failing("AccessDenied"));
        let err = service(backend).list_objects().await.unwrap_err();

        assert!(!err.is_missing_object());
        assert!(err.to_string().contains("AccessDenied"));
    }

    #[test]
    fn test_missing_object_classification() {
        assert!(StorageError::provider("delete object", Some("NoSuchKey"), "gone").is_missing_object());
        assert!(StorageError::provider("sign", Some("NotFound"), "gone").is_missing_object());
        assert!(!StorageError::provider("sign", None, "no code").is_missing_object());
        assert!(!StorageError::MissingKey.is_missing_object());
        assert!(StorageError::MissingKey.is_invalid_input());
    }
}
