pub mod error;
pub mod model;
pub mod service;
pub mod store;

use crate::domain::content::{ContentPayload, SortType};
pub use error::{QueueError, QueueServiceError};
pub use model::{
    clamp_priority, ItemStatus, NewQueueItem, QueueBreakdown, QueueItem, SourceRef, StatusCounts,
    StatusKind, StatusUpdate, DEFAULT_PRIORITY, MAX_PRIORITY, MIN_PRIORITY,
};
use serde::{Deserialize, Serialize};
pub use service::{QueueService, QueueServiceApi, SubredditEnqueue, MAX_RETRY_ATTEMPTS};
pub use store::{QueueSnapshot, QueueStore, INTERRUPTED_ERROR};
use uuid::Uuid;

pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIST_LIMIT: usize = 100;

/// One entry of `items` in POST /api/queue/add
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
}

impl From<EnqueueItemRequest> for NewQueueItem {
    fn from(request: EnqueueItemRequest) -> Self {
        let subreddit = request
            .subreddit
            .or_else(|| request.content.as_ref().and_then(|c| c.subreddit.clone()));
        NewQueueItem {
            source_id: request.source_id,
            payload: request.content,
            priority: request.priority,
            subreddit,
        }
    }
}

/// Request for POST /api/queue/add
///
/// Exactly one of `items`, `post_ids`, `posts` and `subreddit` is expected.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AddToQueueRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<EnqueueItemRequest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub posts: Vec<ContentPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddToQueueResponse {
    pub queue_ids: Vec<Uuid>,
    pub total_in_queue: usize,
}

/// Query for GET /api/queue/items
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueueItemsResponse {
    pub items: Vec<QueueItem>,
    pub count: usize,
}

/// Query for DELETE /api/queue/clear
#[derive(Debug, Default, Deserialize)]
pub struct ClearQueueQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearQueueResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RetryResponse {
    pub queue_ids: Vec<Uuid>,
}
