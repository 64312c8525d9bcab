pub mod audio;
pub mod content;
pub mod processing;
pub mod queue;
pub mod stats;
pub mod tts;
