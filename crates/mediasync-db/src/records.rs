//! Tracked-record repository.

use async_trait::async_trait;
use mediasync_core::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid table name: {0}")]
    InvalidTable(String),
}

impl From<RecordStoreError> for AppError {
    fn from(err: RecordStoreError) -> Self {
        AppError::Database(err.to_string())
    }
}

/// Targeted update against the tracked record: set `media_uri` and bump
/// `updated_at`, returning how many records matched. Multiple updates with
/// the same URI are no-ops in effect.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn set_media_uri(&self, post_id: &str, uri: &str) -> Result<u64, RecordStoreError>;
}

/// Open a Postgres pool for the record store.
pub async fn connect_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, RecordStoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Postgres-backed record store.
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
    table: String,
}

impl PostRepository {
    /// The table name is interpolated into the statement, so it must be a
    /// plain identifier; anything else is rejected here rather than reaching
    /// the database.
    pub fn new(pool: PgPool, table: String) -> Result<Self, RecordStoreError> {
        if table.is_empty()
            || !table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(RecordStoreError::InvalidTable(table));
        }
        Ok(PostRepository { pool, table })
    }
}

#[async_trait]
impl RecordStore for PostRepository {
    async fn set_media_uri(&self, post_id: &str, uri: &str) -> Result<u64, RecordStoreError> {
        let statement = format!(
            "UPDATE {} SET media_uri = $1, updated_at = NOW() WHERE post_id = $2",
            self.table
        );

        let result = sqlx::query(&statement)
            .bind(uri)
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
