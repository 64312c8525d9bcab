/// Failures while writing audio artifacts.
#[derive(Debug, thiserror::Error)]
pub enum AudioStorageError {
    #[error("audio storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
