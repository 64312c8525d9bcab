use super::tts_repository::TtsRepository;
use crate::domain::tts::{LanguageCode, SynthesisError};
use async_trait::async_trait;

/// ID3 tag header, enough for players to recognise the file as MP3
const MP3_HEADER: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00";

/// Offline engine that produces placeholder audio without calling a provider.
#[derive(Debug, Default, Clone)]
pub struct MockTtsRepository;

impl MockTtsRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TtsRepository for MockTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        language: LanguageCode,
        voice: Option<&str>,
        speed: f32,
    ) -> Result<Vec<u8>, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::Invalid("empty text".to_string()));
        }
        if speed <= 0.0 {
            return Err(SynthesisError::Invalid(format!(
                "speed must be positive, got {}",
                speed
            )));
        }

        let mut audio = MP3_HEADER.to_vec();
        audio.extend_from_slice(text.as_bytes());

        tracing::debug!(
            provider = "mock",
            voice = voice.unwrap_or("mock_voice"),
            language = %language,
            audio_size_bytes = audio.len(),
            "TTS synthesis completed"
        );

        Ok(audio)
    }
}
