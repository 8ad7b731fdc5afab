//! Object storage abstraction trait

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;
use tubely_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::IoError(err) => AppError::Storage(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Object storage abstraction
///
/// Each backend serves a single bucket. Operations addressed to another bucket
/// fail with [`StorageError::UnknownBucket`] instead of touching foreign data.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Bucket this backend writes to.
    fn bucket(&self) -> &str;

    /// Store `data` under `key` with the given content type.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Fetch the bytes stored under `key`.
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Time-limited GET URL for `key`.
    async fn presign_get(&self, bucket: &str, key: &str, expires_in: Duration)
        -> StorageResult<String>;

    /// Permanent, unauthenticated URL for `key`.
    fn public_url(&self, bucket: &str, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Fail with `UnknownBucket` unless `bucket` is the one this backend owns.
pub(crate) fn ensure_bucket(expected: &str, bucket: &str) -> StorageResult<()> {
    if expected == bucket {
        Ok(())
    } else {
        Err(StorageError::UnknownBucket(bucket.to_string()))
    }
}
