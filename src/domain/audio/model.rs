use crate::domain::tts::LanguageCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Speech rate used to estimate durations at normal speed.
pub const CHARACTERS_PER_MINUTE: f64 = 1000.0;

/// Reference to a stored audio artifact.
///
/// Size and duration are measured once when the artifact is written and never
/// recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioArtifact {
    pub reference: String,
    pub size_bytes: u64,
    pub duration_seconds: f64,
}

/// Everything the storage layer needs to name and describe an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioMetadata {
    pub item_id: Uuid,
    pub title: String,
    pub subreddit: Option<String>,
    pub engine: String,
    pub voice: Option<String>,
    pub language: LanguageCode,
    pub char_count: usize,
    pub speed: f32,
}

/// Estimate spoken duration from the synthesized character count.
pub fn estimate_duration_seconds(char_count: usize, speed: f32) -> f64 {
    let speed = if speed > 0.0 { speed as f64 } else { 1.0 };
    let minutes = char_count as f64 / CHARACTERS_PER_MINUTE;
    (minutes * 60.0) / speed
}
