//! Mediasync API Library
//!
//! HTTP transport for the ingestion pipeline: handlers, error mapping, and
//! application setup.

mod handlers;
mod telemetry;

pub mod error;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
pub use telemetry::init_tracing;
