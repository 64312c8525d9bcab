use crate::domain::tts::{LanguageCode, SynthesisError};
use async_trait::async_trait;

/// A speech engine.
/// Abstracts the underlying TTS provider (AWS Polly, OpenAI, a local mock, ...)
///
/// Implementations are responsible for:
/// - Handling provider-specific text length limitations
/// - Splitting text into batches and merging the audio chunks in order
/// - Picking a voice for `language` when none is requested
/// - Classifying provider failures as transient or invalid
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize text to speech
    ///
    /// Returns merged audio data ready for playback (MP3 format)
    ///
    /// # Arguments
    /// * `text` - The prepared text to synthesize
    /// * `language` - The detected language of `text`
    /// * `voice` - Provider voice name, or `None` for the language default
    /// * `speed` - Speaking rate, 1.0 being normal
    async fn synthesize(
        &self,
        text: &str,
        language: LanguageCode,
        voice: Option<&str>,
        speed: f32,
    ) -> Result<Vec<u8>, SynthesisError>;
}
