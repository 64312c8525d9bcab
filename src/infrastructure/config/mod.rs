use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Speech engines
    pub default_tts_engine: String,
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    pub openai_tts_voice: String,
    pub polly_enabled: bool,
    pub aws_region: String,
    pub tts_voice: Option<String>,
    pub tts_speed: f32,
    pub tts_cache_enabled: bool,
    // Content source
    pub reddit_base_url: String,
    pub reddit_user_agent: String,
    pub content_cache_enabled: bool,
    /// Leave posts marked over_18 out of listings and fail them on fetch
    pub skip_nsfw: bool,
    // Persistence
    pub audio_output_dir: PathBuf,
    pub queue_snapshot_path: Option<PathBuf>,
    // Processing
    pub process_max_concurrency: usize,
    pub process_item_timeout_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub process_interval_secs: Option<u64>,
    pub process_batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let openai_api_key = optional_var("OPENAI_API_KEY");
        let default_engine = if openai_api_key.is_some() { "openai" } else { "mock" };

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .to_lowercase()
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            default_tts_engine: env::var("DEFAULT_TTS_ENGINE")
                .unwrap_or_else(|_| default_engine.to_string())
                .to_lowercase(),
            openai_api_key,
            openai_tts_model: env::var("OPENAI_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            openai_tts_voice: env::var("OPENAI_TTS_VOICE").unwrap_or_default(),
            polly_enabled: flag("POLLY_ENABLED", false),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            tts_voice: optional_var("TTS_VOICE"),
            tts_speed: env::var("TTS_SPEED")
                .unwrap_or_else(|_| "1.0".to_string())
                .parse()?,
            tts_cache_enabled: flag("TTS_CACHE_ENABLED", false),
            reddit_base_url: env::var("REDDIT_BASE_URL")
                .unwrap_or_else(|_| "https://www.reddit.com".to_string()),
            reddit_user_agent: env::var("REDDIT_USER_AGENT")
                .unwrap_or_else(|_| "postcast-backend/0.1".to_string()),
            content_cache_enabled: flag("CONTENT_CACHE_ENABLED", true),
            skip_nsfw: flag("SKIP_NSFW", true),
            audio_output_dir: env::var("AUDIO_OUTPUT_DIR")
                .unwrap_or_else(|_| "data/audio".to_string())
                .into(),
            queue_snapshot_path: optional_var("QUEUE_SNAPSHOT_PATH").map(PathBuf::from),
            process_max_concurrency: env::var("PROCESS_MAX_CONCURRENCY")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            process_item_timeout_secs: env::var("PROCESS_ITEM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()?,
            retry_max_attempts: env::var("RETRY_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            retry_base_delay_ms: env::var("RETRY_BASE_DELAY_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()?,
            retry_max_delay_ms: env::var("RETRY_MAX_DELAY_MS")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            process_interval_secs: optional_var("PROCESS_INTERVAL_SECS")
                .map(|v| v.parse())
                .transpose()?,
            process_batch_size: env::var("PROCESS_BATCH_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_secs(self.process_item_timeout_secs)
    }

    /// Background processing interval, if the scheduler is enabled.
    pub fn process_interval(&self) -> Option<Duration> {
        self.process_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Unset and blank variables are both treated as absent.
fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}
