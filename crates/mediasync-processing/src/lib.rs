//! Mediasync processing library
//!
//! The ingestion pipeline and its moving parts: scratch-file handling,
//! streaming HTTP fetch, the size-driven compression planner, the ffmpeg
//! transcoder, and the `IngestPipeline` orchestrator that wires them to the
//! storage and record-store collaborators.

pub mod fetcher;
pub mod ingest;
pub mod planner;
pub mod scratch;
pub mod transcoder;

pub use fetcher::{FetchError, Fetcher, HttpFetcher};
pub use ingest::{IngestOutcome, IngestPipeline};
pub use planner::CompressionPlan;
pub use scratch::ScratchFile;
pub use transcoder::{FfmpegTranscoder, TranscodeError, Transcoder};
