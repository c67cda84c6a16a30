use crate::{GcsMediaStore, LocalMediaStore, MediaStore, StorageError, StorageResult};
use mediasync_core::{Config, StorageBackend};
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_media_store(config: &Config) -> StorageResult<Arc<dyn MediaStore>> {
    match config.storage_backend {
        StorageBackend::Gcs => {
            let store = GcsMediaStore::new(config.storage_bucket.clone())?;
            Ok(Arc::new(store))
        }
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let store = LocalMediaStore::new(base_path, config.storage_bucket.clone()).await?;
            Ok(Arc::new(store))
        }
    }
}
