//! Mediasync database library
//!
//! The tracked-record collaborator: a narrow `RecordStore` trait with a
//! Postgres implementation. The service never creates or deletes records,
//! it only performs the targeted `media_uri`/`updated_at` update at the end
//! of the pipeline, and that update is safely re-runnable.

pub mod records;

pub use records::{connect_pool, PostRepository, RecordStore, RecordStoreError};
