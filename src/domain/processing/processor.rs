use super::error::{PipelineFailure, ProcessingError};
use super::retry::RetryPolicy;
use crate::domain::audio::{AudioArtifact, AudioMetadata};
use crate::domain::content::{clean_text, compose_speech, screen_speech, ContentPayload};
use crate::domain::queue::{QueueItem, QueueStore, SourceRef, StatusUpdate};
use crate::domain::tts::TtsServiceApi;
use crate::infrastructure::repositories::{AudioRepository, ContentRepository};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Progress reported once the item's content is known.
pub const PROGRESS_CONTENT_RESOLVED: f32 = 0.25;
/// Progress reported once audio has been synthesized.
pub const PROGRESS_SYNTHESIZED: f32 = 0.75;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct ProcessorSettings {
    /// Items in flight at once, shared by every concurrent pass.
    pub max_concurrency: usize,
    /// Bound on one synthesis + persistence attempt.
    pub item_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            item_timeout: Duration::from_secs(120),
            retry: RetryPolicy::default(),
        }
    }
}

pub struct BatchProcessor {
    store: Arc<QueueStore>,
    content_repo: Arc<dyn ContentRepository>,
    tts_service: Arc<dyn TtsServiceApi>,
    audio_repo: Arc<dyn AudioRepository>,
    permits: Arc<Semaphore>,
    settings: ProcessorSettings,
    shutdown: CancellationToken,
}

impl BatchProcessor {
    pub fn new(
        store: Arc<QueueStore>,
        content_repo: Arc<dyn ContentRepository>,
        tts_service: Arc<dyn TtsServiceApi>,
        audio_repo: Arc<dyn AudioRepository>,
        settings: ProcessorSettings,
        shutdown: CancellationToken,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_concurrency.max(1)));
        Self {
            store,
            content_repo,
            tts_service,
            audio_repo,
            permits,
            settings,
            shutdown,
        }
    }
}

#[async_trait]
pub trait BatchProcessorApi: Send + Sync {
    /// Claim up to `max_items` pending items and drive each one to a final status
    ///
    /// Items run concurrently within the shared worker budget. A failing item
    /// is recorded as failed and never affects its siblings, so the only
    /// errors returned are about the invocation itself.
    async fn process_batch(
        &self,
        max_items: usize,
        engine: &str,
    ) -> Result<BatchSummary, ProcessingError>;
}

#[async_trait]
impl BatchProcessorApi for BatchProcessor {
    async fn process_batch(
        &self,
        max_items: usize,
        engine: &str,
    ) -> Result<BatchSummary, ProcessingError> {
        if max_items == 0 {
            return Err(ProcessingError::InvalidBatchSize);
        }
        let engine = self
            .tts_service
            .resolve_engine(engine)
            .ok_or_else(|| ProcessingError::UnknownEngine(engine.to_string()))?;
        if self.shutdown.is_cancelled() {
            return Err(ProcessingError::ShuttingDown);
        }

        let claimed = self.store.claim_batch(max_items);
        if claimed.is_empty() {
            tracing::debug!(engine = %engine, "No pending items to process");
            return Ok(BatchSummary::default());
        }

        let start_time = Instant::now();
        tracing::info!(
            engine = %engine,
            claimed = claimed.len(),
            max_items = max_items,
            "Processing batch"
        );

        let pipeline = ItemPipeline {
            store: self.store.clone(),
            content_repo: self.content_repo.clone(),
            tts_service: self.tts_service.clone(),
            audio_repo: self.audio_repo.clone(),
            settings: self.settings.clone(),
            engine,
        };

        let handles: Vec<(Uuid, tokio::task::JoinHandle<bool>)> = claimed
            .into_iter()
            .map(|item| {
                let id = item.id;
                let pipeline = pipeline.clone();
                let permits = self.permits.clone();
                let shutdown = self.shutdown.clone();
                let handle = tokio::spawn(async move {
                    let outcome = tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => Err(PipelineFailure::Interrupted),
                        outcome = async {
                            match permits.acquire_owned().await {
                                Ok(_permit) => pipeline.run(&item).await,
                                Err(_) => Err(PipelineFailure::Interrupted),
                            }
                        } => outcome,
                    };
                    pipeline.finalize(item.id, outcome)
                });
                (id, handle)
            })
            .collect();

        let mut summary = BatchSummary {
            processed: handles.len(),
            ..BatchSummary::default()
        };

        for (id, handle) in handles {
            let succeeded = match handle.await {
                Ok(succeeded) => succeeded,
                Err(join_error) => {
                    tracing::error!(item_id = %id, error = %join_error, "Item pipeline aborted");
                    pipeline.finalize(id, Err(PipelineFailure::Panicked))
                }
            };
            if succeeded {
                summary.successful += 1;
            } else {
                summary.failed += 1;
            }
        }

        tracing::info!(
            engine = %pipeline.engine,
            processed = summary.processed,
            successful = summary.successful,
            failed = summary.failed,
            latency_ms = start_time.elapsed().as_millis() as u64,
            "Batch processed"
        );

        Ok(summary)
    }
}

/// Everything one item needs to go from claimed to finished.
#[derive(Clone)]
struct ItemPipeline {
    store: Arc<QueueStore>,
    content_repo: Arc<dyn ContentRepository>,
    tts_service: Arc<dyn TtsServiceApi>,
    audio_repo: Arc<dyn AudioRepository>,
    settings: ProcessorSettings,
    engine: String,
}

impl ItemPipeline {
    async fn run(&self, item: &QueueItem) -> Result<AudioArtifact, PipelineFailure> {
        let payload = self.resolve_content(item).await?;
        self.report_progress(item.id, PROGRESS_CONTENT_RESOLVED);

        let text = compose_speech(&clean_text(&payload.title), &clean_text(&payload.text));
        if text.is_empty() {
            return Err(PipelineFailure::NoContent);
        }
        let text = screen_speech(&text).map_err(|rejection| {
            tracing::info!(item_id = %item.id, reason = %rejection, "Content filtered");
            PipelineFailure::from(rejection)
        })?;

        let timeout = self.settings.item_timeout;
        let payload = &payload;
        let text = text.as_str();
        self.settings
            .retry
            .run(move |attempt| async move {
                match tokio::time::timeout(timeout, self.synthesize_and_store(item, payload, text))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(
                            item_id = %item.id,
                            attempt = attempt,
                            timeout_ms = timeout.as_millis() as u64,
                            "Item attempt timed out"
                        );
                        Err(PipelineFailure::TimedOut(timeout))
                    }
                }
            })
            .await
    }

    async fn resolve_content(&self, item: &QueueItem) -> Result<ContentPayload, PipelineFailure> {
        match &item.source {
            SourceRef::Resolved { payload } => Ok(payload.clone()),
            SourceRef::Remote { source_id } => {
                tracing::debug!(item_id = %item.id, source_id = %source_id, "Resolving content");
                Ok(self.content_repo.fetch_post(source_id).await?)
            }
        }
    }

    async fn synthesize_and_store(
        &self,
        item: &QueueItem,
        payload: &ContentPayload,
        text: &str,
    ) -> Result<AudioArtifact, PipelineFailure> {
        let output = self.tts_service.synthesize(&self.engine, text).await?;
        self.report_progress(item.id, PROGRESS_SYNTHESIZED);

        let voice = self.tts_service.voice_settings();
        let metadata = AudioMetadata {
            item_id: item.id,
            title: payload.title.clone(),
            subreddit: item.subreddit.clone().or_else(|| payload.subreddit.clone()),
            engine: self.engine.clone(),
            voice: voice.voice,
            language: output.language,
            char_count: output.char_count,
            speed: voice.speed,
        };

        Ok(self.audio_repo.persist(&output.audio, &metadata).await?)
    }

    fn report_progress(&self, id: Uuid, progress: f32) {
        if let Err(e) = self.store.update(id, StatusUpdate::Progress(progress)) {
            tracing::warn!(item_id = %id, error = %e, "Progress update rejected");
        }
    }

    /// Record the outcome on the item. Returns whether the item completed.
    fn finalize(&self, id: Uuid, outcome: Result<AudioArtifact, PipelineFailure>) -> bool {
        let (update, succeeded) = match outcome {
            Ok(artifact) => {
                tracing::info!(
                    item_id = %id,
                    engine = %self.engine,
                    reference = %artifact.reference,
                    duration_seconds = artifact.duration_seconds,
                    "Item completed"
                );
                (StatusUpdate::Completed(artifact), true)
            }
            Err(failure) => {
                tracing::warn!(
                    item_id = %id,
                    engine = %self.engine,
                    error = %failure,
                    "Item failed"
                );
                (StatusUpdate::Failed(failure.to_string()), false)
            }
        };

        match self.store.update(id, update) {
            Ok(_) => succeeded,
            Err(e) => {
                tracing::error!(item_id = %id, error = %e, "Final status update rejected");
                false
            }
        }
    }
}
