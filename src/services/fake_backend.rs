//! In-memory `ObjectBackend` used by unit and router tests.

use crate::{
    models::object::ObjectSummary,
    services::storage_service::{ObjectBackend, StorageError, StorageResult},
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

#[derive(Default)]
pub struct FakeBackend {
    objects: Mutex<Vec<ObjectSummary>>,
    fail_code: Option<String>,
    calls: AtomicUsize,
}

impl FakeBackend {
    pub fn with_objects(keys: &[&str]) -> Self {
        let objects = keys
            .iter()
            .enumerate()
            .map(|(i, key)| ObjectSummary {
                key: key.to_string(),
                size: 1024 * (i as i64 + 1),
                last_modified: Utc
                    .with_ymd_and_hms(2024, 1, 1, 10, i as u32, 0)
                    .single()
                    .expect("valid timestamp"),
                etag: format!("\"etag{}\"", i),
            })
            .collect();
        Self {
            objects: Mutex::new(objects),
            ..Self::default()
        }
    }

    /// Every call fails with the given provider error code.
    pub fn failing(code: &str) -> Self {
        Self {
            fail_code: Some(code.to_string()),
            ..Self::default()
        }
    }

    /// Number of provider calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self, operation: &'static str) -> StorageResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_code {
            Some(code) => Err(StorageError::provider(
                operation,
                Some(code.as_str()),
                format!("{}: simulated provider failure", code),
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectBackend for FakeBackend {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> StorageResult<String> {
        self.enter("generate upload URL")?;
        Ok(format!(
            "https://fake.s3.local/{}?x-method=PUT&content-type={}&expires={}",
            key,
            content_type,
            ttl.as_secs()
        ))
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        self.enter("generate download URL")?;
        Ok(format!(
            "https://fake.s3.local/{}?x-method=GET&expires={}",
            key,
            ttl.as_secs()
        ))
    }

    async fn list_objects(&self) -> StorageResult<Vec<ObjectSummary>> {
        self.enter("list objects")?;
        Ok(self.objects.lock().expect("lock poisoned").clone())
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        self.enter("delete object")?;
        self.objects
            .lock()
            .expect("lock poisoned")
            .retain(|object| object.key != key);
        Ok(())
    }

    async fn bucket_location(&self) -> StorageResult<String> {
        self.enter("get bucket location")?;
        Ok("us-east-1".into())
    }
}
