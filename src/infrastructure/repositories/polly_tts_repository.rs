use super::tts_repository::TtsRepository;
use crate::domain::tts::{
    get_voice_for_language, is_voice_neural_compatible, split_into_batches, LanguageCode,
    SynthesisError,
};
use async_trait::async_trait;
use aws_sdk_polly::{
    error::{ProvideErrorMetadata, SdkError},
    types::{Engine, OutputFormat, TextType, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly has a limit of 3000 characters per request
const MAX_BATCH_SIZE: usize = 3000;

/// Polly error codes that mean the request itself is unusable
const INVALID_INPUT_CODES: &[&str] = &[
    "InvalidSsmlException",
    "TextLengthExceededException",
    "LanguageNotSupportedException",
    "EngineNotSupportedException",
    "InvalidSampleRateException",
    "LexiconNotFoundException",
    "ValidationException",
];

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    /// Call AWS Polly to synthesize a single text batch
    async fn call_polly(
        &self,
        text: &str,
        voice_name: &str,
        speed: f32,
    ) -> Result<Vec<u8>, SynthesisError> {
        let voice_id = VoiceId::from(voice_name);
        let engine = if is_voice_neural_compatible(voice_name) {
            Engine::Neural
        } else {
            Engine::Standard
        };
        let (text_type, input) = to_polly_input(text, speed);

        tracing::debug!(
            voice = voice_name,
            engine = ?engine,
            text_type = ?text_type,
            text_length = text.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(input)
            .text_type(text_type)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    voice = voice_name,
                    engine = ?engine,
                    text_length = text.len(),
                    "AWS Polly synthesize_speech failed"
                );
                classify_polly_error(&e)
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            SynthesisError::Transient(format!("Failed to read audio stream: {}", e))
        })?;

        Ok(audio_stream.into_bytes().to_vec())
    }
}

/// Plain text at normal speed, SSML with a prosody rate otherwise
fn to_polly_input(text: &str, speed: f32) -> (TextType, String) {
    if (speed - 1.0).abs() < f32::EPSILON {
        return (TextType::Text, text.to_string());
    }

    let rate = (speed * 100.0).round() as i32;
    (
        TextType::Ssml,
        format!(
            "<speak><prosody rate=\"{}%\">{}</prosody></speak>",
            rate,
            escape_xml(text)
        ),
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn classify_polly_error<E, R>(err: &SdkError<E, R>) -> SynthesisError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(service_err) => classify_polly_code(
            service_err.err().code(),
            service_err.err().message().unwrap_or("unknown error"),
        ),
        SdkError::ConstructionFailure(_) => {
            SynthesisError::Invalid(format!("AWS Polly request could not be built: {}", err))
        }
        _ => SynthesisError::Transient(format!("AWS Polly error: {}", err)),
    }
}

fn classify_polly_code(code: Option<&str>, message: &str) -> SynthesisError {
    let code = code.unwrap_or("Unknown");
    let description = format!("AWS Polly error {}: {}", code, message);
    if INVALID_INPUT_CODES.contains(&code) {
        SynthesisError::Invalid(description)
    } else {
        SynthesisError::Transient(description)
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        language: LanguageCode,
        voice: Option<&str>,
        speed: f32,
    ) -> Result<Vec<u8>, SynthesisError> {
        let start_time = std::time::Instant::now();

        if speed <= 0.0 {
            return Err(SynthesisError::Invalid(format!(
                "speed must be positive, got {}",
                speed
            )));
        }

        let voice_name = voice.unwrap_or_else(|| get_voice_for_language(language));
        let batches = split_into_batches(text, MAX_BATCH_SIZE);
        tracing::debug!(
            batch_count = batches.len(),
            text_length = text.len(),
            "Text split into batches"
        );

        let mut audio_data = Vec::new();
        for (index, batch) in batches.iter().enumerate() {
            audio_data.extend(self.call_polly(batch, voice_name, speed).await?);
            tracing::debug!(
                batch_index = index,
                total_audio_size = audio_data.len(),
                "Batch synthesized and merged"
            );
        }

        let duration = start_time.elapsed();
        tracing::info!(
            provider = "polly",
            voice = voice_name,
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
