pub mod batching;
pub mod error;
pub mod language;
pub mod registry;
pub mod service;

pub use batching::split_into_batches;
pub use error::SynthesisError;
pub use language::{get_voice_for_language, is_voice_neural_compatible, LanguageCode};
pub use registry::{EngineRegistry, DEFAULT_ENGINE_ALIAS};
use serde::{Deserialize, Serialize};
pub use service::{SynthesisOutput, TtsService, TtsServiceApi, VoiceSettings};

/// Engines reported by GET /health/ready
#[derive(Debug, Serialize, Deserialize)]
pub struct EnginesResponse {
    pub default_engine: String,
    pub engines: Vec<String>,
}
