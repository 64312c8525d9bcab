/// Failures reported by the content source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContentError {
    #[error("content not found: {0}")]
    NotFound(String),
    #[error("content unavailable: {0}")]
    Unavailable(String),
    #[error("content restricted: {0}")]
    Restricted(String),
}
