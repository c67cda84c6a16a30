//! Storage abstraction trait
//!
//! All storage backends (GCS, local filesystem) implement `MediaStore`. The
//! pipeline only ever performs metadata probes, deletes, and single-shot
//! uploads, so the trait stays narrow.

use async_trait::async_trait;
use bytes::Bytes;
use mediasync_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Canonical URI for an object: `scheme://bucket/key`. Stable for a given
/// key, so re-ingestion of the same key always yields the same URI.
pub fn format_uri(scheme: &str, bucket: &str, key: &str) -> String {
    format!("{}://{}/{}", scheme, bucket, key)
}

/// Object storage abstraction
///
/// Keys are `channel/creator_id/filename` paths produced by
/// `mediasync_core::StorageKey`; backends treat them as opaque.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Probe object metadata. `Ok(true)` when the object exists, `Ok(false)`
    /// on the backend's not-found signal, `Err` on any other failure.
    async fn head(&self, key: &str) -> StorageResult<bool>;

    /// Delete the object at `key`.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Write `data` to `key` and return the canonical URI.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<String>;

    /// Canonical URI for `key`, without touching storage.
    fn uri_for(&self, key: &str) -> String;
}
