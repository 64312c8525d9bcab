use super::error::QueueServiceError;
use super::model::{clamp_priority, NewQueueItem, QueueBreakdown, QueueItem, StatusKind};
use super::store::QueueStore;
use crate::domain::content::SortType;
use crate::infrastructure::repositories::{ContentRepository, MAX_LISTING_LIMIT};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Failed items are re-enqueued automatically only while their attempt
/// number is below this.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

pub const DEFAULT_LISTING_LIMIT: usize = 10;

/// Parameters for enqueueing posts straight from a subreddit listing.
#[derive(Debug, Clone)]
pub struct SubredditEnqueue {
    pub subreddit: String,
    pub sort: SortType,
    pub limit: usize,
    pub min_score: i64,
}

impl SubredditEnqueue {
    pub fn new(subreddit: impl Into<String>) -> Self {
        Self {
            subreddit: subreddit.into(),
            sort: SortType::default(),
            limit: DEFAULT_LISTING_LIMIT,
            min_score: 0,
        }
    }
}

pub struct QueueService {
    store: Arc<QueueStore>,
    content_repo: Arc<dyn ContentRepository>,
}

impl QueueService {
    pub fn new(store: Arc<QueueStore>, content_repo: Arc<dyn ContentRepository>) -> Self {
        Self {
            store,
            content_repo,
        }
    }
}

#[async_trait]
pub trait QueueServiceApi: Send + Sync {
    /// Enqueue items atomically. Either every item is accepted or none is.
    async fn enqueue(&self, items: Vec<NewQueueItem>) -> Result<Vec<Uuid>, QueueServiceError>;

    /// Fetch a subreddit listing and enqueue each post that reaches `min_score`
    ///
    /// Priority is derived from the post score (one step per 100 points).
    async fn enqueue_subreddit(
        &self,
        request: SubredditEnqueue,
    ) -> Result<Vec<Uuid>, QueueServiceError>;

    async fn status(&self) -> QueueBreakdown;

    /// Items in insertion order, at most `limit` of them
    async fn list_items(&self, status: Option<StatusKind>, limit: usize) -> Vec<QueueItem>;

    async fn get_item(&self, id: Uuid) -> Result<QueueItem, QueueServiceError>;

    /// Remove items by status, `None` meaning every item that is not processing
    async fn clear(&self, status: Option<StatusKind>) -> usize;

    /// Re-enqueue every failed item that still has attempts left as a new item
    async fn retry_failed(&self) -> Vec<Uuid>;

    /// Re-enqueue one failed item as a new item
    async fn retry_item(&self, id: Uuid) -> Result<Uuid, QueueServiceError>;
}

#[async_trait]
impl QueueServiceApi for QueueService {
    async fn enqueue(&self, items: Vec<NewQueueItem>) -> Result<Vec<Uuid>, QueueServiceError> {
        if items.is_empty() {
            return Err(QueueServiceError::Invalid(
                "at least one item is required".to_string(),
            ));
        }

        let ids = self.store.add_many(items)?;
        tracing::info!(count = ids.len(), "Items added to queue");
        Ok(ids)
    }

    async fn enqueue_subreddit(
        &self,
        request: SubredditEnqueue,
    ) -> Result<Vec<Uuid>, QueueServiceError> {
        let subreddit = request.subreddit.trim().trim_start_matches("r/").to_string();
        if subreddit.is_empty() {
            return Err(QueueServiceError::Invalid(
                "subreddit must not be empty".to_string(),
            ));
        }

        let limit = request.limit.clamp(1, MAX_LISTING_LIMIT);
        let posts = self
            .content_repo
            .fetch_subreddit(&subreddit, request.sort, limit)
            .await?;
        let fetched = posts.len();

        let items: Vec<NewQueueItem> = posts
            .into_iter()
            .filter(|post| post.score >= request.min_score)
            .map(|post| {
                let priority = priority_from_score(post.score);
                let label = post
                    .content
                    .subreddit
                    .clone()
                    .unwrap_or_else(|| subreddit.clone());
                NewQueueItem::resolved(post.content)
                    .with_priority(priority)
                    .with_subreddit(label)
            })
            .collect();

        if items.is_empty() {
            tracing::info!(
                subreddit = %subreddit,
                fetched = fetched,
                min_score = request.min_score,
                "No posts qualified for the queue"
            );
            return Ok(Vec::new());
        }

        let ids = self.store.add_many(items)?;
        tracing::info!(
            subreddit = %subreddit,
            fetched = fetched,
            queued = ids.len(),
            "Subreddit posts added to queue"
        );
        Ok(ids)
    }

    async fn status(&self) -> QueueBreakdown {
        QueueBreakdown::from_items(&self.store.list_by_status(None))
    }

    async fn list_items(&self, status: Option<StatusKind>, limit: usize) -> Vec<QueueItem> {
        let mut items = self.store.list_by_status(status);
        items.truncate(limit);
        items
    }

    async fn get_item(&self, id: Uuid) -> Result<QueueItem, QueueServiceError> {
        Ok(self.store.get(id)?)
    }

    async fn clear(&self, status: Option<StatusKind>) -> usize {
        let removed = self.store.clear(status);
        tracing::info!(
            status = status.map(|s| s.as_str()).unwrap_or("all"),
            removed = removed,
            "Queue cleared"
        );
        removed
    }

    async fn retry_failed(&self) -> Vec<Uuid> {
        let requeued = self.store.requeue_failed(MAX_RETRY_ATTEMPTS);
        for (failed_id, retry_id) in &requeued {
            tracing::info!(
                item_id = %failed_id,
                retry_id = %retry_id,
                "Failed item re-enqueued"
            );
        }
        requeued.into_iter().map(|(_, retry_id)| retry_id).collect()
    }

    async fn retry_item(&self, id: Uuid) -> Result<Uuid, QueueServiceError> {
        let retry_id = self.store.requeue(id)?;
        tracing::info!(item_id = %id, retry_id = %retry_id, "Failed item re-enqueued");
        Ok(retry_id)
    }
}

/// One priority step per 100 points of score, within the valid range.
pub fn priority_from_score(score: i64) -> i32 {
    let steps = score.div_euclid(100).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    clamp_priority(steps)
}
