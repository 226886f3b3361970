//! In-process `ObjectStore` used by the test suite and by `--in-memory`
//! local runs. Nothing is persisted.

use crate::services::storage_service::{
    ObjectDownload, ObjectStore, ObjectSummary, StorageError, StorageResult,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::io;
use tokio::sync::RwLock;

/// Size of the chunks a download body is split into.
const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// Objects keyed by `(bucket, key)`; the ordered map gives S3-style
/// lexicographic listings for free.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<(String, String), StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects across all buckets.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        max_keys: i32,
    ) -> StorageResult<Vec<ObjectSummary>> {
        let limit = usize::try_from(max_keys).unwrap_or(0);
        let prefix = prefix.unwrap_or("");
        let objects = self.objects.read().await;

        let files = objects
            .range((bucket.to_string(), prefix.to_string())..)
            .take_while(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .take(limit)
            .map(|((_, key), obj)| ObjectSummary {
                key: key.clone(),
                size: obj.data.len() as i64,
                last_modified: Some(obj.last_modified),
            })
            .collect();

        Ok(files)
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        let size = body.len();
        self.objects.write().await.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: body,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        tracing::debug!(bucket = %bucket, key = %key, size_bytes = size, "stored object in memory");
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<ObjectDownload> {
        let object = self
            .objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;

        let data = object.data;
        let chunks: Vec<io::Result<Bytes>> = (0..data.len())
            .step_by(CHUNK_SIZE)
            .map(|offset| Ok(data.slice(offset..(offset + CHUNK_SIZE).min(data.len()))))
            .collect();

        Ok(ObjectDownload {
            content_type: Some(object.content_type),
            content_length: Some(data.len() as u64),
            body: stream::iter(chunks).boxed(),
        })
    }
}
