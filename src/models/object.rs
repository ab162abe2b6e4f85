//! Represents objects as reported by the bucket listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single stored object, as described by one listing entry.
///
/// Every field is copied from the provider's listing; nothing here is
/// computed locally.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ObjectSummary {
    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Size in bytes.
    pub size: i64,

    /// Timestamp when object was last modified, serialized as RFC 3339.
    pub last_modified: DateTime<Utc>,

    /// Entity tag as returned by the provider (usually quoted).
    pub etag: String,
}

/// Body of `GET /media/files`.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ObjectListing {
    pub objects: Vec<ObjectSummary>,
    pub count: usize,
}

impl From<Vec<ObjectSummary>> for ObjectListing {
    fn from(objects: Vec<ObjectSummary>) -> Self {
        Self {
            count: objects.len(),
            objects,
        }
    }
}

/// Body of `DELETE /media/files/{*key}`.
///
/// The provider does not say whether the key existed, so neither does this.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DeletionReceipt {
    pub message: String,
    pub key: String,
}

impl DeletionReceipt {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            message: "Object deleted successfully".into(),
            key: key.into(),
        }
    }
}
