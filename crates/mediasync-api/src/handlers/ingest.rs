use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use mediasync_core::IngestRequest;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct IngestMediaRequest {
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub creator_id: i64,
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub media_url: String,
}

#[derive(Debug, Serialize)]
pub struct IngestMediaResponse {
    pub message: String,
    pub file_path: String,
}

/// `POST /upload`: run the full ingestion pipeline synchronously and respond
/// with the canonical storage URI.
#[tracing::instrument(
    skip(state, payload),
    fields(channel = %payload.channel, creator_id = payload.creator_id, post_id = %payload.post_id)
)]
pub async fn ingest_media(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IngestMediaRequest>,
) -> Result<Json<IngestMediaResponse>, HttpAppError> {
    let request = IngestRequest::new(
        payload.channel,
        payload.creator_id,
        payload.post_id,
        payload.media_url,
    )?;

    let outcome = state.pipeline.ingest(&request).await?;

    let message = if outcome.deduplicated {
        "File already in storage, record refreshed"
    } else {
        "Upload complete"
    };

    Ok(Json(IngestMediaResponse {
        message: message.to_string(),
        file_path: outcome.uri,
    }))
}
