//! `ObjectBackend` over the AWS S3 API (or any S3-compatible endpoint).

use crate::{
    config::AppConfig,
    models::object::ObjectSummary,
    services::storage_service::{ObjectBackend, StorageError, StorageResult},
};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    presigning::PresigningConfig,
    primitives::DateTime as SmithyDateTime,
    types::Object,
};
use chrono::{DateTime, Utc};
use std::{error::Error, fmt::Debug, time::Duration};
use tracing::{debug, warn};

const DEFAULT_BUCKET_REGION: &str = "us-east-1";

pub struct S3Backend {
    client: Client,
    bucket: String,
}

impl S3Backend {
    /// Build a client with the static credentials from `cfg`.
    ///
    /// A custom endpoint switches to path-style addressing, which MinIO and
    /// most S3-compatible stores require.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let creds = Credentials::new(
            &cfg.access_key_id,
            &cfg.secret_access_key,
            None,
            None,
            "media-gateway",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version_latest()
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(creds);
        if let Some(endpoint) = &cfg.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: cfg.bucket.clone(),
        }
    }

    fn presigning(ttl: Duration) -> StorageResult<PresigningConfig> {
        PresigningConfig::expires_in(ttl).map_err(|e| StorageError::Presigning(e.to_string()))
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> StorageResult<String> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(Self::presigning(ttl)?)
            .await
            .map_err(|e| provider_error("generate upload URL", e))?;

        Ok(request.uri().to_string())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(Self::presigning(ttl)?)
            .await
            .map_err(|e| provider_error("generate download URL", e))?;

        Ok(request.uri().to_string())
    }

    async fn list_objects(&self) -> StorageResult<Vec<ObjectSummary>> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| provider_error("list objects", e))?;

        if output.is_truncated().unwrap_or(false) {
            debug!(bucket = %self.bucket, "listing truncated at provider page size");
        }

        Ok(output.contents().iter().filter_map(summarize).collect())
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| provider_error("delete object", e))?;
        Ok(())
    }

    async fn bucket_location(&self) -> StorageResult<String> {
        let output = self
            .client
            .get_bucket_location()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| provider_error("get bucket location", e))?;

        Ok(normalize_location(
            output.location_constraint().map(|c| c.as_str()),
        ))
    }
}

/// Reshape one listing entry.
///
/// Entries without a key are skipped. Entries the provider reports without
/// size, timestamp or ETag are skipped too and logged, so every summary
/// carries provider values only.
fn summarize(object: &Object) -> Option<ObjectSummary> {
    let key = object.key()?;
    let (Some(size), Some(last_modified), Some(etag)) = (
        object.size(),
        object.last_modified().and_then(to_chrono),
        object.e_tag(),
    ) else {
        warn!(key, "skipping listing entry with incomplete metadata");
        return None;
    };

    Some(ObjectSummary {
        key: key.to_string(),
        size,
        last_modified,
        etag: etag.to_string(),
    })
}

fn to_chrono(ts: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

/// S3 reports the classic region as an empty constraint.
fn normalize_location(constraint: Option<&str>) -> String {
    match constraint {
        Some(region) if !region.is_empty() => region.to_string(),
        _ => DEFAULT_BUCKET_REGION.to_string(),
    }
}

fn provider_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + Error + 'static,
    R: Debug,
{
    StorageError::provider(operation, err.code(), DisplayErrorContext(&err).to_string())
}
