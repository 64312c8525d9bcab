pub mod error;
pub mod model;

pub use error::AudioStorageError;
pub use model::{estimate_duration_seconds, AudioArtifact, AudioMetadata};
