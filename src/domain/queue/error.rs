use super::model::StatusKind;
use crate::domain::content::ContentError;
use crate::error::AppError;
use uuid::Uuid;

/// Errors raised by the queue store itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueueError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("queue item {0} not found")]
    NotFound(Uuid),
    #[error("queue item {id} is {status}, expected {expected}")]
    InvalidTransition {
        id: Uuid,
        status: StatusKind,
        expected: StatusKind,
    },
    #[error("queue item {id} was already re-enqueued as {retry_id}")]
    AlreadyRequeued { id: Uuid, retry_id: Uuid },
}

#[derive(Debug, thiserror::Error)]
pub enum QueueServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("queue item {0} not found")]
    NotFound(Uuid),
    #[error("content not found: {0}")]
    SourceNotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<QueueError> for QueueServiceError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::InvalidInput(msg) => QueueServiceError::Invalid(msg),
            QueueError::NotFound(id) => QueueServiceError::NotFound(id),
            QueueError::InvalidTransition { .. } | QueueError::AlreadyRequeued { .. } => {
                QueueServiceError::Conflict(err.to_string())
            }
        }
    }
}

impl From<ContentError> for QueueServiceError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound(what) => QueueServiceError::SourceNotFound(what),
            ContentError::Unavailable(msg) => QueueServiceError::Dependency(msg),
            ContentError::Restricted(reason) => QueueServiceError::Invalid(reason),
        }
    }
}

impl From<QueueServiceError> for AppError {
    fn from(err: QueueServiceError) -> Self {
        match err {
            QueueServiceError::Invalid(msg) => AppError::BadRequest(msg),
            QueueServiceError::NotFound(id) => AppError::NotFound(format!("Queue item {}", id)),
            QueueServiceError::SourceNotFound(what) => AppError::NotFound(what),
            QueueServiceError::Conflict(msg) => AppError::Conflict(msg),
            QueueServiceError::Dependency(msg) => AppError::ExternalService(msg),
            QueueServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
