//! In-process object store for development and tests.

use crate::keys::validate_key;
use crate::traits::{ensure_bucket, ObjectStorage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Object store kept in memory.
///
/// URLs have the shape `{base_url}/{key}`; presigned URLs append an
/// `expires` query parameter. [`MemoryStorage::fetch_url`] resolves either form
/// back to the stored object.
#[derive(Clone)]
pub struct MemoryStorage {
    bucket: String,
    base_url: String,
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Look up the object a URL produced by this store points at.
    pub async fn fetch_url(&self, url: &str) -> Option<StoredObject> {
        let path = url.strip_prefix(&self.base_url)?.strip_prefix('/')?;
        let key = path.split('?').next().unwrap_or(path);
        self.objects.read().await.get(key).cloned()
    }

    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        ensure_bucket(&self.bucket, bucket)?;
        validate_key(key)?;
        let size = data.len();
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        tracing::debug!(bucket = %bucket, key = %key, size_bytes = size, "Memory storage put");
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        ensure_bucket(&self.bucket, bucket)?;
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        ensure_bucket(&self.bucket, bucket)?;
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        ensure_bucket(&self.bucket, bucket)?;
        validate_key(key)?;
        Ok(format!(
            "{}?expires={}",
            self.public_url(bucket, key),
            expires_in.as_secs()
        ))
    }

    fn public_url(&self, _bucket: &str, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
