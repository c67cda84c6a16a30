//! Test helpers: build the app router with local storage and fake
//! collaborators, plus a throwaway HTTP server acting as the media source.
//!
//! Run with: `cargo test -p mediasync-api`

use async_trait::async_trait;
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use axum_test::TestServer;
use bytes::Bytes;
use mediasync_api::setup::routes::setup_routes;
use mediasync_api::state::AppState;
use mediasync_core::{Config, StorageBackend};
use mediasync_db::{RecordStore, RecordStoreError};
use mediasync_processing::{
    CompressionPlan, HttpFetcher, IngestPipeline, TranscodeError, Transcoder,
};
use mediasync_storage::LocalMediaStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// In-memory record store standing in for Postgres.
#[derive(Default)]
pub struct FakeRecords {
    updates: Mutex<HashMap<String, Vec<String>>>,
}

impl FakeRecords {
    pub fn updates_for(&self, post_id: &str) -> Vec<String> {
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
        self.updates
            .lock()
            .unwrap()
            .entry(post_id.to_string())
            .or_default()
            .push(uri.to_string());
        Ok(1)
    }
}

/// Transcoder spy; optionally fails to exercise the degrade path.
pub struct FakeTranscoder {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeTranscoder {
    pub fn new(fail: bool) -> Self {
        FakeTranscoder {
            calls: AtomicUsize::new(0),
            fail,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, input: &Path, _plan: &CompressionPlan) -> Result<(), TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TranscodeError::ToolFailed {
                tool: "ffmpeg".to_string(),
                code: Some(1),
                stderr: "simulated failure".to_string(),
            });
        }
        tokio::fs::write(input, b"transcoded").await?;
        Ok(())
    }
}

/// Throwaway HTTP server serving one payload at every path, counting hits.
pub struct SourceServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl SourceServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn serve_media(
    State((body, hits)): State<(Bytes, Arc<AtomicUsize>)>,
) -> Bytes {
    hits.fetch_add(1, Ordering::SeqCst);
    body
}

pub async fn spawn_source_server(body: Vec<u8>) -> SourceServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/{*path}", get(serve_media))
        .with_state((Bytes::from(body), hits.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind source server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Source server died");
    });

    SourceServer {
        base_url: format!("http://{}", addr),
        hits,
    }
}

/// Test application with its owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<LocalMediaStore>,
    pub records: Arc<FakeRecords>,
    pub transcoder: Arc<FakeTranscoder>,
    pub source: SourceServer,
    pub store_dir: TempDir,
    _scratch_dir: TempDir,
}

impl TestApp {
    /// Path of a stored object on disk, for content assertions.
    pub fn stored_path(&self, key: &str) -> PathBuf {
        self.store_dir.path().join(key)
    }

    pub fn media_url(&self, path: &str) -> String {
        format!("{}{}", self.source.base_url, path)
    }
}

/// Setup the app with local storage, a fake record store, a transcoder spy,
/// and a real streaming fetcher pointed at the given source payload.
pub async fn setup_test_app(source_body: Vec<u8>, transcoder_fails: bool) -> TestApp {
    let store_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();

    let config = Config {
        server_port: 0,
        storage_backend: StorageBackend::Local,
        storage_bucket: "test-bucket".to_string(),
        local_storage_path: Some(store_dir.path().to_path_buf()),
        database_url: None,
        db_max_connections: 5,
        records_table: "posts".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
        scratch_dir: scratch_dir.path().to_path_buf(),
        max_download_bytes: 100 * 1024 * 1024,
    };

    let store = Arc::new(
        LocalMediaStore::new(store_dir.path(), config.storage_bucket.clone())
            .await
            .unwrap(),
    );
    let records = Arc::new(FakeRecords::default());
    let transcoder = Arc::new(FakeTranscoder::new(transcoder_fails));
    let fetcher = Arc::new(HttpFetcher::new(config.max_download_bytes).unwrap());
    let source = spawn_source_server(source_body).await;

    let pipeline = IngestPipeline::new(
        store.clone(),
        Some(records.clone()),
        fetcher,
        transcoder.clone(),
        config.scratch_dir.clone(),
    );

    let state = Arc::new(AppState { config, pipeline });
    let server = TestServer::new(setup_routes(state)).unwrap();

    TestApp {
        server,
        store,
        records,
        transcoder,
        source,
        store_dir,
        _scratch_dir: scratch_dir,
    }
}
