use async_trait::async_trait;
use postcast_backend::domain::audio::{AudioArtifact, AudioMetadata, AudioStorageError};
use postcast_backend::domain::content::{ContentError, ContentPayload, Post, SortType};
use postcast_backend::domain::tts::{LanguageCode, SynthesisError};
use postcast_backend::infrastructure::repositories::{
    AudioRepository, ContentRepository, TtsRepository,
};

/// Content source serving canned posts.
pub struct StubContentRepository;

#[async_trait]
impl ContentRepository for StubContentRepository {
    async fn fetch_post(&self, source_id: &str) -> Result<ContentPayload, ContentError> {
        match source_id {
            "missing" => Err(ContentError::NotFound(format!("post {}", source_id))),
            "broken" => Err(ContentError::Unavailable("upstream returned 503".to_string())),
            "nsfw" => Err(ContentError::Restricted("post nsfw is marked NSFW".to_string())),
            "removed" => Ok(ContentPayload {
                title: "Update on my landlord situation".to_string(),
                text: "[removed]".to_string(),
                subreddit: Some("stories".to_string()),
                author: None,
            }),
            id => Ok(ContentPayload {
                title: format!("Story {}", id),
                text: "I finally told my neighbour about the noise and it went well.".to_string(),
                subreddit: Some("stories".to_string()),
                author: Some("someone".to_string()),
            }),
        }
    }

    async fn fetch_subreddit(
        &self,
        subreddit: &str,
        _sort: SortType,
        limit: usize,
    ) -> Result<Vec<Post>, ContentError> {
        if subreddit == "doesnotexist" {
            return Err(ContentError::NotFound(format!("r/{}", subreddit)));
        }

        let posts = [("p1", 1250), ("p2", 320), ("p3", 40)]
            .iter()
            .map(|(id, score)| Post {
                id: id.to_string(),
                score: *score,
                over_18: false,
                content: ContentPayload {
                    title: format!("Listing post {}", id),
                    text: "A long story from the listing.".to_string(),
                    subreddit: Some(subreddit.to_string()),
                    author: None,
                },
            })
            .take(limit)
            .collect();
        Ok(posts)
    }
}

/// Engine that rejects every input.
pub struct RejectingTtsRepository;

#[async_trait]
impl TtsRepository for RejectingTtsRepository {
    async fn synthesize(
        &self,
        _text: &str,
        _language: LanguageCode,
        _voice: Option<&str>,
        _speed: f32,
    ) -> Result<Vec<u8>, SynthesisError> {
        Err(SynthesisError::Invalid("voice not available".to_string()))
    }
}

/// Storage that keeps nothing and reports 10 second, 100 KB artifacts.
pub struct FixedAudioRepository;

#[async_trait]
impl AudioRepository for FixedAudioRepository {
    async fn persist(
        &self,
        _audio: &[u8],
        metadata: &AudioMetadata,
    ) -> Result<AudioArtifact, AudioStorageError> {
        Ok(AudioArtifact {
            reference: format!("memory://{}.mp3", metadata.item_id),
            size_bytes: 100_000,
            duration_seconds: 10.0,
        })
    }
}
