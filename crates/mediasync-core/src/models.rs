//! Domain models: ingest requests and storage keys.

use crate::error::AppError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// A validated request to ingest one remotely hosted media file.
///
/// Constructed once per request; every field is required. Validation happens
/// here, before any network or storage call is made.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRequest {
    pub channel: String,
    pub creator_id: i64,
    pub post_id: String,
    pub media_url: String,
}

impl IngestRequest {
    pub fn new(
        channel: String,
        creator_id: i64,
        post_id: String,
        media_url: String,
    ) -> Result<Self, AppError> {
        let request = IngestRequest {
            channel,
            creator_id,
            post_id,
            media_url,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check that no field is empty/zero.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.channel.trim().is_empty()
            || self.creator_id == 0
            || self.post_id.trim().is_empty()
            || self.media_url.trim().is_empty()
        {
            return Err(AppError::InvalidInput(
                "channel, creator_id, post_id and media_url are all required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deterministic object-storage path: `channel/creator_id/filename`.
///
/// The filename is the last path segment of the source URL with any query
/// string stripped. The key doubles as the deduplication identifier, so the
/// same (channel, creator, filename) triple always maps to the same object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    key: String,
    filename_start: usize,
}

impl StorageKey {
    /// Derive the storage key for a request. Pure, no I/O.
    ///
    /// Fails only when the source URL has no usable path segment (e.g. a URL
    /// ending in `/`), which would yield an empty filename.
    pub fn for_request(request: &IngestRequest) -> Result<Self, AppError> {
        Self::build(&request.channel, request.creator_id, &request.media_url)
    }

    pub fn build(channel: &str, creator_id: i64, media_url: &str) -> Result<Self, AppError> {
        let filename = source_filename(media_url);
        if filename.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "media_url has no usable filename: {}",
                media_url
            )));
        }

        let prefix = format!("{}/{}/", channel, creator_id);
        let filename_start = prefix.len();
        Ok(StorageKey {
            key: format!("{}{}", prefix, filename),
            filename_start,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Final path segment of the key (the source filename).
    pub fn filename(&self) -> &str {
        &self.key[self.filename_start..]
    }

    /// Whether the key carries a file extension. A key without one is never
    /// treated as a valid cache hit.
    pub fn has_extension(&self) -> bool {
        Path::new(self.filename()).extension().is_some()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Last path segment of the URL, query string stripped.
fn source_filename(media_url: &str) -> &str {
    let without_query = media_url.split('?').next().unwrap_or_default();
    without_query.rsplit('/').next().unwrap_or_default()
}
