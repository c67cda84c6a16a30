//! Source retrieval: stream the remote media into a scratch file.

use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("response exceeds download limit of {limit_bytes} bytes")]
    TooLarge { limit_bytes: u64 },

    #[error("failed to write scratch file: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP retrieval collaborator. Writes the response body to `dest` without
/// buffering the full payload in memory and returns the byte count. An empty
/// body is accepted.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// Streaming fetcher over reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(max_bytes: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(HttpFetcher { client, max_bytes })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Refuse oversized payloads up front when the server declares a
        // length, and again while streaming for servers that do not.
        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes {
                return Err(FetchError::TooLarge {
                    limit_bytes: self.max_bytes,
                });
            }
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Request(e.to_string()))?;
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(FetchError::TooLarge {
                    limit_bytes: self.max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::info!(url = %url, size_bytes = written, "Source download complete");
        Ok(written)
    }
}
