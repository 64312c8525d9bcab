use super::tts_repository::TtsRepository;
use crate::domain::tts::{split_into_batches, LanguageCode, SynthesisError};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request
const MAX_BATCH_SIZE: usize = 4096;

/// Speed range accepted by the speech endpoint
const MIN_SPEED: f32 = 0.25;
const MAX_SPEED: f32 = 4.0;

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    default_voice: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String, default_voice: String) -> Self {
        Self {
            client,
            model,
            default_voice,
        }
    }

    /// Select the appropriate OpenAI voice for a language
    fn get_voice_for_language(language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::English => "alloy",
            LanguageCode::Spanish => "echo",
            LanguageCode::French => "nova",
            LanguageCode::German => "onyx",
            LanguageCode::Italian => "fable",
            LanguageCode::Portuguese => "shimmer",
        }
    }

    fn parse_voice(voice: &str) -> Result<Voice, SynthesisError> {
        match voice.to_lowercase().as_str() {
            "alloy" => Ok(Voice::Alloy),
            "echo" => Ok(Voice::Echo),
            "fable" => Ok(Voice::Fable),
            "onyx" => Ok(Voice::Onyx),
            "nova" => Ok(Voice::Nova),
            "shimmer" => Ok(Voice::Shimmer),
            other => Err(SynthesisError::Invalid(format!(
                "unsupported OpenAI voice '{}'",
                other
            ))),
        }
    }

    fn model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    /// Call OpenAI TTS API to synthesize a single text batch
    async fn call_openai(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
    ) -> Result<Vec<u8>, SynthesisError> {
        tracing::debug!(
            model = %self.model,
            voice = voice,
            speed = speed,
            text_length = text.len(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.model(),
            input: text.to_string(),
            voice: Self::parse_voice(voice)?,
            response_format: None,
            speed: Some(speed),
        };

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    model = %self.model,
                    voice = voice,
                    text_length = text.len(),
                    "OpenAI TTS API call failed"
                );
                classify_openai_error(e)
            })?;

        Ok(response.bytes.to_vec())
    }
}

/// API errors about the request itself are not worth retrying, everything
/// else (transport, rate limits, server errors) is.
fn classify_openai_error(err: OpenAIError) -> SynthesisError {
    match err {
        OpenAIError::ApiError(api) => {
            let kind = api.r#type.clone().unwrap_or_default();
            let message = format!("OpenAI TTS error: {}", api.message);
            if kind == "invalid_request_error" {
                SynthesisError::Invalid(message)
            } else {
                SynthesisError::Transient(message)
            }
        }
        OpenAIError::InvalidArgument(msg) => {
            SynthesisError::Invalid(format!("OpenAI TTS error: {}", msg))
        }
        other => SynthesisError::Transient(format!("OpenAI TTS error: {}", other)),
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        language: LanguageCode,
        voice: Option<&str>,
        speed: f32,
    ) -> Result<Vec<u8>, SynthesisError> {
        let start_time = std::time::Instant::now();

        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(SynthesisError::Invalid(format!(
                "speed {} outside {}..={}",
                speed, MIN_SPEED, MAX_SPEED
            )));
        }

        let voice = match voice {
            Some(voice) => voice.to_string(),
            None if !self.default_voice.is_empty() => self.default_voice.clone(),
            None => Self::get_voice_for_language(language).to_string(),
        };

        let batches = split_into_batches(text, MAX_BATCH_SIZE);
        tracing::debug!(
            batch_count = batches.len(),
            text_length = text.len(),
            "Text split into batches"
        );

        let mut audio_data = Vec::new();
        for (index, batch) in batches.iter().enumerate() {
            audio_data.extend(self.call_openai(batch, &voice, speed).await?);
            tracing::debug!(
                batch_index = index,
                total_audio_size = audio_data.len(),
                "Batch synthesized and merged"
            );
        }

        let duration = start_time.elapsed();
        tracing::info!(
            provider = "openai",
            model = %self.model,
            voice = %voice,
            language = %language,
            latency_ms = duration.as_millis(),
            characters_count = text.len(),
            batch_count = batches.len(),
            audio_size_bytes = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(audio_data)
    }
}
