use super::error::SynthesisError;
use super::language::LanguageCode;
use super::registry::EngineRegistry;
use async_trait::async_trait;
use lingua::{LanguageDetector, LanguageDetectorBuilder};
use moka::future::Cache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub audio: Vec<u8>,
    pub language: LanguageCode,
    pub char_count: usize,
}

/// Voice and speed applied to every synthesis call.
#[derive(Debug, Clone)]
pub struct VoiceSettings {
    pub voice: Option<String>,
    pub speed: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice: None,
            speed: 1.0,
        }
    }
}

pub struct TtsService {
    registry: EngineRegistry,
    settings: VoiceSettings,
    language_detector: LanguageDetector,
    cache: Option<Cache<u64, SynthesisOutput>>,
}

impl TtsService {
    pub fn new(registry: EngineRegistry, settings: VoiceSettings, cache_enabled: bool) -> Self {
        let language_detector = LanguageDetectorBuilder::from_all_languages().build();

        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(100)
                    .time_to_idle(Duration::from_secs(30 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self {
            registry,
            settings,
            language_detector,
            cache,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Canonical name of a registered engine, resolving the `default` alias.
    fn resolve_engine(&self, requested: &str) -> Option<String>;

    fn engine_names(&self) -> Vec<String>;

    fn default_engine(&self) -> String;

    fn voice_settings(&self) -> VoiceSettings;

    /// Synthesize prepared text with the named engine
    ///
    /// Detects the language of `text` so the engine can pick a matching voice
    /// when none is configured. Results are cached per engine, voice, speed
    /// and text when caching is enabled.
    async fn synthesize(&self, engine: &str, text: &str)
        -> Result<SynthesisOutput, SynthesisError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    fn resolve_engine(&self, requested: &str) -> Option<String> {
        self.registry.resolve_name(requested).map(str::to_string)
    }

    fn engine_names(&self) -> Vec<String> {
        self.registry.names()
    }

    fn default_engine(&self) -> String {
        self.registry.default_engine().to_string()
    }

    fn voice_settings(&self) -> VoiceSettings {
        self.settings.clone()
    }

    async fn synthesize(
        &self,
        engine: &str,
        text: &str,
    ) -> Result<SynthesisOutput, SynthesisError> {
        let repository = self
            .registry
            .get(engine)
            .ok_or_else(|| SynthesisError::Invalid(format!("unknown engine '{}'", engine)))?;

        let cache_key = self.cache_key(engine, text);
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&cache_key).await {
                tracing::info!(
                    engine = engine,
                    cached_audio_size = cached.audio.len(),
                    cached_language = %cached.language,
                    "TTS cache hit - returning cached audio"
                );
                return Ok(cached);
            }
        }

        let language = self.detect_language(text);
        let char_count = text.chars().count();

        tracing::debug!(
            engine = engine,
            language = %language,
            char_count = char_count,
            "Language detected for TTS synthesis"
        );

        let audio = repository
            .synthesize(
                text,
                language,
                self.settings.voice.as_deref(),
                self.settings.speed,
            )
            .await?;

        let output = SynthesisOutput {
            audio,
            language,
            char_count,
        };

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, output.clone()).await;
            tracing::debug!(
                engine = engine,
                audio_size = output.audio.len(),
                "TTS result cached"
            );
        }

        Ok(output)
    }
}

impl TtsService {
    fn detect_language(&self, text: &str) -> LanguageCode {
        match self.language_detector.detect_language_of(text) {
            Some(language) => LanguageCode::from_lingua(language),
            None => {
                tracing::warn!("Could not detect language, falling back to English");
                LanguageCode::English
            }
        }
    }

    fn cache_key(&self, engine: &str, text: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.registry.resolve_name(engine).hash(&mut hasher);
        self.settings.voice.hash(&mut hasher);
        self.settings.speed.to_bits().hash(&mut hasher);
        text.hash(&mut hasher);
        hasher.finish()
    }
}
