use crate::traits::{format_uri, MediaStore, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

const URI_SCHEME: &str = "file";

/// Local filesystem storage implementation, used for development and tests.
///
/// Objects live under `base_path/{key}`; the `bucket` label only shapes the
/// canonical URI so local URIs stay structurally identical to GCS ones.
#[derive(Clone)]
pub struct LocalMediaStore {
    base_path: PathBuf,
    bucket: String,
}

impl LocalMediaStore {
    pub async fn new(base_path: impl Into<PathBuf>, bucket: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalMediaStore { base_path, bucket })
    }

    /// Convert storage key to filesystem path, rejecting traversal sequences
    /// that could escape the base directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn head(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %key, "Local delete successful");
                Ok(())
            }
            // Deleting a missing object is a no-op, matching object-store semantics
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let size = data.len() as u64;
        fs::write(&path, &data)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::info!(key = %key, size_bytes = size, "Local upload successful");
        Ok(self.uri_for(key))
    }

    fn uri_for(&self, key: &str) -> String {
        format_uri(URI_SCHEME, &self.bucket, key)
    }
}
