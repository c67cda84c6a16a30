use crate::traits::{format_uri, MediaStore, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};

const URI_SCHEME: &str = "gs";

/// Google Cloud Storage implementation
#[derive(Clone)]
pub struct GcsMediaStore {
    store: GoogleCloudStorage,
    bucket: String,
}

impl GcsMediaStore {
    /// Create a new GcsMediaStore instance.
    ///
    /// Credentials are resolved from the environment
    /// (`GOOGLE_APPLICATION_CREDENTIALS` / metadata server), the standard
    /// `object_store` behavior.
    pub fn new(bucket: String) -> StorageResult<Self> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(GcsMediaStore { store, bucket })
    }
}

#[async_trait]
impl MediaStore for GcsMediaStore {
    async fn head(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "GCS delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GCS delete successful"
        );

        Ok(())
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<String> {
        let size = data.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(data)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "GCS upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GCS upload successful"
        );

        Ok(self.uri_for(key))
    }

    fn uri_for(&self, key: &str) -> String {
        format_uri(URI_SCHEME, &self.bucket, key)
    }
}
