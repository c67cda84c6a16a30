//! Application state shared across handlers.

use mediasync_core::Config;
use mediasync_processing::IngestPipeline;

pub struct AppState {
    pub config: Config,
    pub pipeline: IngestPipeline,
}
