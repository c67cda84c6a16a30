//! Application setup and initialization
//!
//! Collaborators are constructed here, from configuration, and injected into
//! the pipeline; nothing is created lazily inside request handling.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use mediasync_core::Config;
use mediasync_db::{connect_pool, PostRepository, RecordStore};
use mediasync_processing::{FfmpegTranscoder, HttpFetcher, IngestPipeline};
use mediasync_storage::create_media_store;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let store = create_media_store(&config)
        .await
        .context("Failed to initialize object storage")?;

    let records: Option<Arc<dyn RecordStore>> = match &config.database_url {
        Some(url) => {
            let pool = connect_pool(url, config.db_max_connections)
                .await
                .context("Failed to connect to the record database")?;
            let repository = PostRepository::new(pool, config.records_table.clone())
                .context("Invalid records table configuration")?;
            Some(Arc::new(repository))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, record updates are disabled");
            None
        }
    };

    let fetcher = Arc::new(
        HttpFetcher::new(config.max_download_bytes).context("Failed to build HTTP client")?,
    );
    let transcoder = Arc::new(FfmpegTranscoder::new(config.ffmpeg_path.clone()));

    let pipeline = IngestPipeline::new(
        store,
        records,
        fetcher,
        transcoder,
        config.scratch_dir.clone(),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        pipeline,
    });

    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
