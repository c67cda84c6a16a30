//! Mediasync core library
//!
//! Shared building blocks for the ingestion service: configuration loaded
//! from the environment, the unified error type, and the domain models
//! (ingest requests and storage keys).

pub mod config;
pub mod error;
pub mod models;

pub use config::{Config, StorageBackend};
pub use error::AppError;
pub use models::{IngestRequest, StorageKey};
