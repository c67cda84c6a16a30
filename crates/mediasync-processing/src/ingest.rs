//! Ingestion orchestration: probe storage → fetch → plan → transcode →
//! upload → update record, with a dedup short-circuit straight to the record
//! update.

use std::path::PathBuf;
use std::sync::Arc;

use mediasync_core::{AppError, IngestRequest, StorageKey};
use mediasync_db::RecordStore;
use mediasync_storage::MediaStore;

use crate::fetcher::Fetcher;
use crate::planner::CompressionPlan;
use crate::scratch::ScratchFile;
use crate::transcoder::Transcoder;

/// Result of one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Canonical `scheme://bucket/key` URI of the stored object.
    pub uri: String,
    /// Whether an existing valid object was reused instead of re-ingesting.
    pub deduplicated: bool,
}

/// One sequential ingestion pipeline per request, no internal parallelism
/// and no shared mutable state across requests. The record store is optional:
/// deployments without a database still ingest media, the terminal update is
/// simply skipped.
pub struct IngestPipeline {
    store: Arc<dyn MediaStore>,
    records: Option<Arc<dyn RecordStore>>,
    fetcher: Arc<dyn Fetcher>,
    transcoder: Arc<dyn Transcoder>,
    scratch_dir: PathBuf,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn MediaStore>,
        records: Option<Arc<dyn RecordStore>>,
        fetcher: Arc<dyn Fetcher>,
        transcoder: Arc<dyn Transcoder>,
        scratch_dir: PathBuf,
    ) -> Self {
        IngestPipeline {
            store,
            records,
            fetcher,
            transcoder,
            scratch_dir,
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// Fatal errors abandon the request with no rollback; a later identical
    /// request restarts from the dedup probe. The scratch file is removed
    /// only after a confirmed upload and left behind on failure.
    pub async fn ingest(&self, request: &IngestRequest) -> Result<IngestOutcome, AppError> {
        request.validate()?;
        let key = StorageKey::for_request(request)?;

        tracing::info!(
            channel = %request.channel,
            creator_id = request.creator_id,
            key = %key,
            "Starting media ingestion"
        );

        if let Some(uri) = self.probe_existing(&key).await? {
            self.update_record(&request.post_id, &uri).await?;
            return Ok(IngestOutcome {
                uri,
                deduplicated: true,
            });
        }

        let scratch = ScratchFile::allocate(&self.scratch_dir, key.filename());
        let size_bytes = self
            .fetcher
            .fetch(&request.media_url, scratch.path())
            .await
            .map_err(|e| AppError::Fetch(e.to_string()))?;

        let plan = CompressionPlan::for_size(size_bytes);
        if plan.needed {
            // Degrade-and-continue: a failed compression never blocks the
            // upload of the original asset.
            match self.transcoder.transcode(scratch.path(), &plan).await {
                Ok(()) => {
                    tracing::info!(key = %key, scale_factor = plan.scale_factor, "Transcode complete")
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Transcode failed, keeping original file")
                }
            }
        } else {
            tracing::debug!(key = %key, size_bytes, "File small enough, skipping transcode");
        }

        let data = tokio::fs::read(scratch.path()).await?;
        let uri = self.store.put(key.as_str(), data.into()).await?;

        if let Err(e) = scratch.remove().await {
            tracing::warn!(key = %key, error = %e, "Failed to remove scratch file");
        }

        self.update_record(&request.post_id, &uri).await?;

        Ok(IngestOutcome {
            uri,
            deduplicated: false,
        })
    }

    /// Dedup probe. A valid existing object short-circuits the pipeline; an
    /// extension-less object is a previously corrupted write: delete it
    /// (best effort) and report absent so the full pipeline runs.
    async fn probe_existing(&self, key: &StorageKey) -> Result<Option<String>, AppError> {
        if !self.store.head(key.as_str()).await? {
            return Ok(None);
        }

        if key.has_extension() {
            let uri = self.store.uri_for(key.as_str());
            tracing::info!(key = %key, uri = %uri, "Object already in storage, reusing");
            return Ok(Some(uri));
        }

        tracing::warn!(key = %key, "Found object without file extension, deleting");
        if let Err(e) = self.store.delete(key.as_str()).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete extension-less object");
        }
        Ok(None)
    }

    /// Terminal record update. A missing record is logged and tolerated; a
    /// transport failure is fatal for the request.
    async fn update_record(&self, post_id: &str, uri: &str) -> Result<(), AppError> {
        let Some(records) = &self.records else {
            return Ok(());
        };

        let matched = records.set_media_uri(post_id, uri).await?;
        if matched == 0 {
            tracing::warn!(post_id = %post_id, "No record matched post_id, uri not attached");
        } else {
            tracing::info!(post_id = %post_id, uri = %uri, "Record updated with media uri");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchError;
    use crate::transcoder::TranscodeError;
    use async_trait::async_trait;
    use bytes::Bytes;
    use mediasync_db::RecordStoreError;
    use mediasync_storage::{LocalMediaStore, StorageError, StorageResult};
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakeFetcher {
        body: Vec<u8>,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(body: Vec<u8>) -> Self {
            FakeFetcher {
                body,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, _url: &str, dest: &Path) -> Result<u64, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::fs::write(dest, &self.body).await?;
            Ok(self.body.len() as u64)
        }
    }

    struct FakeTranscoder {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeTranscoder {
        fn new(fail: bool) -> Self {
            FakeTranscoder {
                calls: AtomicUsize::new(0),
                fail,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transcoder for FakeTranscoder {
        async fn transcode(
            &self,
            input: &Path,
            _plan: &CompressionPlan,
        ) -> Result<(), TranscodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TranscodeError::ToolFailed {
                    tool: "ffmpeg".to_string(),
                    code: Some(1),
                    stderr: "boom".to_string(),
                });
            }
            tokio::fs::write(input, b"transcoded").await?;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeRecords {
        updates: Mutex<HashMap<String, Vec<String>>>,
        fail: bool,
    }

    impl FakeRecords {
        fn updates_for(&self, post_id: &str) -> Vec<String> {
            self.updates
                .lock()
                .unwrap()
                .get(post_id)
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl RecordStore for FakeRecords {
        async fn set_media_uri(&self, post_id: &str, uri: &str) -> Result<u64, RecordStoreError> {
            if self.fail {
                return Err(RecordStoreError::Database(sqlx::Error::PoolClosed));
            }
            self.updates
                .lock()
                .unwrap()
                .entry(post_id.to_string())
                .or_default()
                .push(uri.to_string());
            Ok(1)
        }
    }

    /// Storage that always fails puts, for the scratch-retention test.
    struct BrokenStore;

    #[async_trait]
    impl MediaStore for BrokenStore {
        async fn head(&self, _key: &str) -> StorageResult<bool> {
            Ok(false)
        }
        async fn delete(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
        async fn put(&self, _key: &str, _data: Bytes) -> StorageResult<String> {
            Err(StorageError::UploadFailed("backend down".to_string()))
        }
        fn uri_for(&self, key: &str) -> String {
            format!("gs://broken/{}", key)
        }
    }

    struct Harness {
        pipeline: IngestPipeline,
        store: Arc<LocalMediaStore>,
        fetcher: Arc<FakeFetcher>,
        transcoder: Arc<FakeTranscoder>,
        records: Arc<FakeRecords>,
        _store_dir: TempDir,
        scratch_dir: TempDir,
    }

    async fn harness(body: Vec<u8>, transcode_fails: bool) -> Harness {
        let store_dir = TempDir::new().unwrap();
        let scratch_dir = TempDir::new().unwrap();
        let store = Arc::new(
            LocalMediaStore::new(store_dir.path(), "test-bucket".to_string())
                .await
                .unwrap(),
        );
        let fetcher = Arc::new(FakeFetcher::new(body));
        let transcoder = Arc::new(FakeTranscoder::new(transcode_fails));
        let records = Arc::new(FakeRecords::default());

        let pipeline = IngestPipeline::new(
            store.clone(),
            Some(records.clone()),
            fetcher.clone(),
            transcoder.clone(),
            scratch_dir.path().to_path_buf(),
        );

        Harness {
            pipeline,
            store,
            fetcher,
            transcoder,
            records,
            _store_dir: store_dir,
            scratch_dir,
        }
    }

    fn request(media_url: &str) -> IngestRequest {
        IngestRequest {
            channel: "acme".to_string(),
            creator_id: 42,
            post_id: "p1".to_string(),
            media_url: media_url.to_string(),
        }
    }

    fn scratch_files(dir: &TempDir) -> Vec<PathBuf> {
        std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    #[tokio::test]
    async fn small_file_skips_transcoder() {
        let h = harness(b"tiny clip".to_vec(), false).await;

        let outcome = h
            .pipeline
            .ingest(&request("https://x/y/video.mp4?sig=1"))
            .await
            .unwrap();

        assert!(!outcome.deduplicated);
        assert_eq!(outcome.uri, "file://test-bucket/acme/42/video.mp4");
        assert_eq!(h.transcoder.calls(), 0);
        assert!(h.store.head("acme/42/video.mp4").await.unwrap());
        assert_eq!(h.records.updates_for("p1"), vec![outcome.uri.clone()]);
        assert!(scratch_files(&h.scratch_dir).is_empty());
    }

    #[tokio::test]
    async fn large_file_is_transcoded() {
        let h = harness(vec![0u8; 4 * 1024 * 1024], false).await;

        let outcome = h
            .pipeline
            .ingest(&request("https://x/big.mp4"))
            .await
            .unwrap();

        assert_eq!(h.transcoder.calls(), 1);
        assert!(!outcome.deduplicated);
    }

    #[tokio::test]
    async fn second_ingest_short_circuits_at_the_probe() {
        let h = harness(b"tiny clip".to_vec(), false).await;
        let req = request("https://x/y/video.mp4?sig=1");

        let first = h.pipeline.ingest(&req).await.unwrap();
        let second = h.pipeline.ingest(&req).await.unwrap();

        assert!(!first.deduplicated);
        assert!(second.deduplicated);
        assert_eq!(first.uri, second.uri);
        // Fetcher ran exactly once, but the record was refreshed both times.
        assert_eq!(h.fetcher.calls(), 1);
        assert_eq!(h.records.updates_for("p1").len(), 2);
    }

    #[tokio::test]
    async fn extension_less_object_is_deleted_and_reingested() {
        let h = harness(b"fresh bytes".to_vec(), false).await;
        h.store
            .put("acme/42/video", Bytes::from_static(b"stale corrupt write"))
            .await
            .unwrap();

        let outcome = h.pipeline.ingest(&request("https://x/video")).await.unwrap();

        // Never a cache hit: the orphan was replaced by a fresh ingestion.
        assert!(!outcome.deduplicated);
        assert_eq!(h.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn transcode_failure_uploads_the_original() {
        let h = harness(vec![7u8; 4 * 1024 * 1024], true).await;

        let outcome = h
            .pipeline
            .ingest(&request("https://x/big.mp4"))
            .await
            .unwrap();

        assert_eq!(h.transcoder.calls(), 1);
        assert!(!outcome.deduplicated);
        assert!(h.store.head("acme/42/big.mp4").await.unwrap());
    }

    #[tokio::test]
    async fn upload_failure_is_fatal_and_keeps_the_scratch_file() {
        let scratch_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher::new(b"bytes".to_vec()));
        let pipeline = IngestPipeline::new(
            Arc::new(BrokenStore),
            None,
            fetcher.clone(),
            Arc::new(FakeTranscoder::new(false)),
            scratch_dir.path().to_path_buf(),
        );

        let err = pipeline
            .ingest(&request("https://x/video.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));

        // Left in place for manual recovery.
        assert_eq!(scratch_files(&scratch_dir).len(), 1);
    }

    #[tokio::test]
    async fn record_transport_failure_is_fatal() {
        let store_dir = TempDir::new().unwrap();
        let scratch_dir = TempDir::new().unwrap();
        let store = Arc::new(
            LocalMediaStore::new(store_dir.path(), "test-bucket".to_string())
                .await
                .unwrap(),
        );
        let records = Arc::new(FakeRecords {
            fail: true,
            ..Default::default()
        });
        let pipeline = IngestPipeline::new(
            store,
            Some(records),
            Arc::new(FakeFetcher::new(b"bytes".to_vec())),
            Arc::new(FakeTranscoder::new(false)),
            scratch_dir.path().to_path_buf(),
        );

        let err = pipeline
            .ingest(&request("https://x/video.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn missing_record_store_is_tolerated() {
        let store_dir = TempDir::new().unwrap();
        let scratch_dir = TempDir::new().unwrap();
        let store = Arc::new(
            LocalMediaStore::new(store_dir.path(), "test-bucket".to_string())
                .await
                .unwrap(),
        );
        let pipeline = IngestPipeline::new(
            store,
            None,
            Arc::new(FakeFetcher::new(b"bytes".to_vec())),
            Arc::new(FakeTranscoder::new(false)),
            scratch_dir.path().to_path_buf(),
        );

        let outcome = pipeline.ingest(&request("https://x/video.mp4")).await.unwrap();
        assert_eq!(outcome.uri, "file://test-bucket/acme/42/video.mp4");
    }

    #[tokio::test]
    async fn bad_url_fails_before_any_collaborator_runs() {
        let h = harness(b"bytes".to_vec(), false).await;

        let err = h
            .pipeline
            .ingest(&request("https://x/path/"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(h.fetcher.calls(), 0);
    }
}
