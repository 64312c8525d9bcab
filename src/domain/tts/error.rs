/// Failure reported by a speech engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthesisError {
    /// Network trouble, throttling or a provider outage. Worth retrying.
    #[error("transient engine error: {0}")]
    Transient(String),
    /// The engine rejected the input itself (voice, speed or text).
    #[error("engine rejected input: {0}")]
    Invalid(String),
}

impl SynthesisError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SynthesisError::Transient(_))
    }
}
