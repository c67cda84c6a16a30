//! Mediasync storage library
//!
//! Object-storage abstraction for the ingestion pipeline. The `MediaStore`
//! trait exposes exactly the operations the pipeline needs (head, delete,
//! put) plus canonical `scheme://bucket/key` URI derivation, with a Google
//! Cloud Storage backend for production and a local filesystem backend for
//! development and tests.

pub mod factory;
pub mod gcs;
pub mod local;
pub mod traits;

pub use factory::create_media_store;
pub use gcs::GcsMediaStore;
pub use local::LocalMediaStore;
pub use traits::{MediaStore, StorageError, StorageResult};
