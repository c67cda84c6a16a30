//! Error types module
//!
//! All request-level failures are unified under the `AppError` enum so the
//! transport layer can map them to HTTP responses in one place. Collaborator
//! crates (storage, db, processing) define their own error enums and convert
//! into `AppError` at the pipeline boundary.

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing request fields, or an unusable storage key.
    /// Rejected before any external call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Object storage read/write/delete failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Network retrieval of the source media failed (connect error,
    /// non-success status, or local write failure).
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Record store transport/connection failure.
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
