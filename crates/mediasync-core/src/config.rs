//! Configuration module
//!
//! All process-wide settings are loaded once at startup from environment
//! variables (with `.env` support in the binary) and passed into each
//! component at construction time. No mutable global state.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BUCKET: &str = "creator-media";
const DEFAULT_RECORDS_TABLE: &str = "posts";
const DEFAULT_MAX_DOWNLOAD_MB: u64 = 100;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;

/// Object storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Gcs,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcs" | "gcp" => Ok(StorageBackend::Gcs),
            "local" => Ok(StorageBackend::Local),
            other => anyhow::bail!("unknown storage backend: {}", other),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port (`PORT`, default 8080).
    pub server_port: u16,
    /// Storage backend (`STORAGE_BACKEND`: `gcs` or `local`, default `gcs`).
    pub storage_backend: StorageBackend,
    /// Bucket name (`STORAGE_BUCKET`).
    pub storage_bucket: String,
    /// Root directory for the local backend (`LOCAL_STORAGE_PATH`).
    pub local_storage_path: Option<PathBuf>,
    /// Postgres connection string (`DATABASE_URL`). When unset, the service
    /// still ingests media but skips the record update entirely.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Table holding tracked records (`RECORDS_TABLE`, default `posts`).
    pub records_table: String,
    /// Path to the ffmpeg binary (`FFMPEG_PATH`, default `ffmpeg`).
    pub ffmpeg_path: String,
    /// Directory for in-flight scratch files (`SCRATCH_DIR`, default the
    /// system temp dir).
    pub scratch_dir: PathBuf,
    /// Refuse source downloads larger than this (`MAX_DOWNLOAD_MB`, default 100).
    pub max_download_bytes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let server_port = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "gcs".to_string())
            .parse::<StorageBackend>()?;

        let storage_bucket =
            env::var("STORAGE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string());

        let local_storage_path = env::var("LOCAL_STORAGE_PATH").ok().map(PathBuf::from);

        let database_url = env::var("DATABASE_URL").ok();

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| DEFAULT_DB_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a number")?;

        let records_table =
            env::var("RECORDS_TABLE").unwrap_or_else(|_| DEFAULT_RECORDS_TABLE.to_string());

        let ffmpeg_path = env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string());

        let scratch_dir = env::var("SCRATCH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir());

        let max_download_mb = env::var("MAX_DOWNLOAD_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_DOWNLOAD_MB.to_string())
            .parse::<u64>()
            .context("MAX_DOWNLOAD_MB must be a number")?;

        let config = Config {
            server_port,
            storage_backend,
            storage_bucket,
            local_storage_path,
            database_url,
            db_max_connections,
            records_table,
            ffmpeg_path,
            scratch_dir,
            max_download_bytes: max_download_mb * 1024 * 1024,
        };
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on misconfiguration.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage_bucket.trim().is_empty() {
            anyhow::bail!("STORAGE_BUCKET must not be empty");
        }
        if self.storage_backend == StorageBackend::Local && self.local_storage_path.is_none() {
            anyhow::bail!("LOCAL_STORAGE_PATH is required when STORAGE_BACKEND=local");
        }
        if self.records_table.is_empty()
            || !self
                .records_table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            anyhow::bail!("RECORDS_TABLE must be a plain SQL identifier");
        }
        Ok(())
    }
}
