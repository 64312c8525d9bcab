pub mod audio_repository;
pub mod content_repository;
pub mod mock_tts_repository;
pub mod openai_tts_repository;
pub mod polly_tts_repository;
pub mod queue_snapshot_repository;
pub mod tts_repository;

pub use audio_repository::{AudioRepository, FsAudioRepository};
pub use content_repository::{ContentRepository, RedditContentRepository, MAX_LISTING_LIMIT};
pub use mock_tts_repository::MockTtsRepository;
pub use openai_tts_repository::OpenAiTtsRepository;
pub use polly_tts_repository::PollyTtsRepository;
pub use queue_snapshot_repository::QueueSnapshotRepository;
pub use tts_repository::TtsRepository;
