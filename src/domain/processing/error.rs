use super::retry::Retryable;
use crate::domain::audio::AudioStorageError;
use crate::domain::content::{ContentError, FilterRejection};
use crate::domain::queue::INTERRUPTED_ERROR;
use crate::domain::tts::SynthesisError;
use crate::error::AppError;
use std::time::Duration;

/// Errors that reject a whole processing pass before anything is claimed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProcessingError {
    #[error("max_items must be at least 1")]
    InvalidBatchSize,
    #[error("unknown engine '{0}'")]
    UnknownEngine(String),
    #[error("processor is shutting down")]
    ShuttingDown,
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::InvalidBatchSize | ProcessingError::UnknownEngine(_) => {
                AppError::BadRequest(err.to_string())
            }
            ProcessingError::ShuttingDown => AppError::Conflict(err.to_string()),
        }
    }
}

/// Why a single item ended up failed. The display text becomes the item's error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineFailure {
    #[error("content unavailable: {0}")]
    ContentUnavailable(String),
    #[error("no content to synthesize")]
    NoContent,
    #[error("content filtered as unsafe: {0}")]
    Filtered(String),
    #[error("speech engine unavailable: {0}")]
    EngineTransient(String),
    #[error("speech engine rejected input: {0}")]
    EngineInvalid(String),
    #[error("failed to store audio: {0}")]
    Persistence(String),
    #[error("timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),
    #[error("{}", INTERRUPTED_ERROR)]
    Interrupted,
    #[error("pipeline panicked")]
    Panicked,
}

impl Retryable for PipelineFailure {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineFailure::EngineTransient(_) | PipelineFailure::TimedOut(_)
        )
    }
}

impl From<ContentError> for PipelineFailure {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound(what) => {
                PipelineFailure::ContentUnavailable(format!("{} not found", what))
            }
            ContentError::Unavailable(msg) => PipelineFailure::ContentUnavailable(msg),
            ContentError::Restricted(reason) => PipelineFailure::Filtered(reason),
        }
    }
}

impl From<FilterRejection> for PipelineFailure {
    fn from(rejection: FilterRejection) -> Self {
        PipelineFailure::Filtered(rejection.to_string())
    }
}

impl From<SynthesisError> for PipelineFailure {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::Transient(msg) => PipelineFailure::EngineTransient(msg),
            SynthesisError::Invalid(msg) => PipelineFailure::EngineInvalid(msg),
        }
    }
}

impl From<AudioStorageError> for PipelineFailure {
    fn from(err: AudioStorageError) -> Self {
        PipelineFailure::Persistence(err.to_string())
    }
}
