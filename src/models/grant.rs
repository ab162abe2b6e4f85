//! Presigned URL grants handed out to clients.

use serde::{Deserialize, Serialize};

/// Default MIME type when the caller does not name one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Body of `POST /media/upload-url`.
#[derive(Debug, Deserialize)]
pub struct UploadUrlRequest {
    pub filename: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

/// A write-only signed URL for a freshly generated key.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadGrant {
    pub upload_url: String,
    pub key: String,
    pub expires_in: u64,
}

/// A read-only signed URL for a caller-supplied key.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DownloadGrant {
    pub download_url: String,
    pub key: String,
    pub expires_in: u64,
}
