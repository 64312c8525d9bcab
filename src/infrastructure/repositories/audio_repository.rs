use crate::domain::audio::{
    estimate_duration_seconds, AudioArtifact, AudioMetadata, AudioStorageError,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};

const MAX_TITLE_SLUG_LEN: usize = 30;

/// Where synthesized audio ends up.
#[async_trait]
pub trait AudioRepository: Send + Sync {
    /// Store audio bytes and describe the stored artifact
    async fn persist(
        &self,
        audio: &[u8],
        metadata: &AudioMetadata,
    ) -> Result<AudioArtifact, AudioStorageError>;
}

#[derive(Serialize)]
struct ArtifactRecord<'a> {
    #[serde(flatten)]
    metadata: &'a AudioMetadata,
    #[serde(flatten)]
    artifact: &'a AudioArtifact,
    created_at: chrono::DateTime<Utc>,
}

/// Writes each artifact as an MP3 file plus a JSON sidecar with its metadata.
pub struct FsAudioRepository {
    output_dir: PathBuf,
}

impl FsAudioRepository {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    fn file_stem(metadata: &AudioMetadata) -> String {
        let subreddit = metadata
            .subreddit
            .as_deref()
            .map(slugify)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let mut title = slugify(&metadata.title);
        if title.is_empty() {
            title = "untitled".to_string();
        }
        let title: String = title.chars().take(MAX_TITLE_SLUG_LEN).collect();
        let title = title.trim_end_matches('_');

        let short_id: String = metadata.item_id.simple().to_string().chars().take(8).collect();

        format!(
            "{}_{}_{}_{}",
            subreddit,
            title,
            Utc::now().format("%Y%m%d_%H%M%S"),
            short_id
        )
    }
}

/// Lower-case alphanumerics, with runs of spaces and dashes turned into `_`.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

impl FsAudioRepository {
    /// Write `{stem}.mp3` and its `{stem}.json` sidecar. The audio file is
    /// removed again if the sidecar cannot be written.
    async fn write_artifact(
        &self,
        stem: &str,
        audio: &[u8],
        metadata: &AudioMetadata,
    ) -> Result<AudioArtifact, AudioStorageError> {
        let audio_path = self.output_dir.join(format!("{}.mp3", stem));
        tokio::fs::write(&audio_path, audio).await?;

        let artifact = AudioArtifact {
            reference: audio_path.to_string_lossy().into_owned(),
            size_bytes: audio.len() as u64,
            duration_seconds: estimate_duration_seconds(metadata.char_count, metadata.speed),
        };

        let sidecar_path = self.output_dir.join(format!("{}.json", stem));
        if let Err(e) = Self::write_sidecar(&sidecar_path, metadata, &artifact).await {
            if let Err(cleanup) = tokio::fs::remove_file(&audio_path).await {
                tracing::warn!(
                    path = %audio_path.display(),
                    error = %cleanup,
                    "Failed to remove orphaned audio file"
                );
            }
            return Err(e);
        }

        Ok(artifact)
    }

    async fn write_sidecar(
        path: &Path,
        metadata: &AudioMetadata,
        artifact: &AudioArtifact,
    ) -> Result<(), AudioStorageError> {
        let record = ArtifactRecord {
            metadata,
            artifact,
            created_at: Utc::now(),
        };
        let sidecar = serde_json::to_vec_pretty(&record)
            .map_err(|e| AudioStorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        tokio::fs::write(path, sidecar).await?;
        Ok(())
    }
}

#[async_trait]
impl AudioRepository for FsAudioRepository {
    async fn persist(
        &self,
        audio: &[u8],
        metadata: &AudioMetadata,
    ) -> Result<AudioArtifact, AudioStorageError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let stem = Self::file_stem(metadata);
        let artifact = self.write_artifact(&stem, audio, metadata).await?;

        tracing::info!(
            item_id = %metadata.item_id,
            path = %artifact.reference,
            size_bytes = artifact.size_bytes,
            duration_seconds = artifact.duration_seconds,
            "Audio artifact stored"
        );

        Ok(artifact)
    }
}
