pub mod error;
pub mod processor;
pub mod retry;
pub mod scheduler;

pub use error::{PipelineFailure, ProcessingError};
pub use processor::{BatchProcessor, BatchProcessorApi, BatchSummary, ProcessorSettings};
pub use retry::{RetryPolicy, Retryable};
pub use scheduler::{spawn_scheduler, SchedulerSettings};
use serde::Deserialize;

pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Request for POST /api/queue/process
#[derive(Debug, Default, Deserialize)]
pub struct ProcessQueueRequest {
    pub max_items: Option<usize>,
    pub engine: Option<String>,
}
