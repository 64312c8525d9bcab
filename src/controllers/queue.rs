use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::processing::{
    BatchProcessor, BatchProcessorApi, BatchSummary, ProcessQueueRequest, DEFAULT_BATCH_SIZE,
};
use crate::domain::queue::{
    AddToQueueRequest, AddToQueueResponse, ClearQueueQuery, ClearQueueResponse, ListItemsQuery,
    NewQueueItem, QueueBreakdown, QueueItem, QueueItemsResponse, QueueService, QueueServiceApi,
    RetryResponse, StatusKind, SubredditEnqueue, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};
use crate::domain::tts::DEFAULT_ENGINE_ALIAS;
use crate::error::{AppError, AppResult};

pub struct QueueController {
    queue_service: Arc<QueueService>,
    processor: Arc<BatchProcessor>,
}

impl QueueController {
    pub fn new(queue_service: Arc<QueueService>, processor: Arc<BatchProcessor>) -> Self {
        Self {
            queue_service,
            processor,
        }
    }

    /// POST /api/queue/add - Enqueue items, post ids, posts or a subreddit listing
    pub async fn add(
        State(controller): State<Arc<QueueController>>,
        Json(request): Json<AddToQueueRequest>,
    ) -> AppResult<Json<AddToQueueResponse>> {
        let modes = [
            !request.items.is_empty(),
            !request.post_ids.is_empty(),
            !request.posts.is_empty(),
            request.subreddit.is_some(),
        ];
        match modes.iter().filter(|m| **m).count() {
            0 => {
                return Err(AppError::BadRequest(
                    "provide one of items, post_ids, posts or subreddit".to_string(),
                ))
            }
            1 => {}
            _ => {
                return Err(AppError::BadRequest(
                    "items, post_ids, posts and subreddit are mutually exclusive".to_string(),
                ))
            }
        }

        let priority = request.priority;
        let queue_ids = if let Some(subreddit) = request.subreddit {
            let mut listing = SubredditEnqueue::new(subreddit);
            if let Some(sort) = request.sort {
                listing.sort = sort;
            }
            if let Some(limit) = request.limit {
                listing.limit = limit;
            }
            if let Some(min_score) = request.min_score {
                listing.min_score = min_score;
            }
            controller.queue_service.enqueue_subreddit(listing).await?
        } else {
            let items: Vec<NewQueueItem> = if !request.items.is_empty() {
                request
                    .items
                    .into_iter()
                    .map(|entry| {
                        let mut item = NewQueueItem::from(entry);
                        item.priority = item.priority.or(priority);
                        item
                    })
                    .collect()
            } else if !request.post_ids.is_empty() {
                request
                    .post_ids
                    .into_iter()
                    .map(|id| NewQueueItem {
                        priority,
                        ..NewQueueItem::remote(id)
                    })
                    .collect()
            } else {
                request
                    .posts
                    .into_iter()
                    .map(|post| NewQueueItem {
                        priority,
                        ..NewQueueItem::resolved(post)
                    })
                    .collect()
            };
            controller.queue_service.enqueue(items).await?
        };

        let total_in_queue = controller.queue_service.status().await.counts.total;
        Ok(Json(AddToQueueResponse {
            queue_ids,
            total_in_queue,
        }))
    }

    /// GET /api/queue/status - Status counts with priority and subreddit breakdowns
    pub async fn status(
        State(controller): State<Arc<QueueController>>,
    ) -> AppResult<Json<QueueBreakdown>> {
        Ok(Json(controller.queue_service.status().await))
    }

    /// GET /api/queue/items - List items in insertion order
    pub async fn list_items(
        State(controller): State<Arc<QueueController>>,
        Query(query): Query<ListItemsQuery>,
    ) -> AppResult<Json<QueueItemsResponse>> {
        let status = parse_status_filter(query.status.as_deref())?;
        let limit = query
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);

        let items = controller.queue_service.list_items(status, limit).await;
        Ok(Json(QueueItemsResponse {
            count: items.len(),
            items,
        }))
    }

    /// GET /api/queue/items/{id} - Single item
    pub async fn get_item(
        State(controller): State<Arc<QueueController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<Json<QueueItem>> {
        Ok(Json(controller.queue_service.get_item(id).await?))
    }

    /// POST /api/queue/process - Run one processing pass
    pub async fn process(
        State(controller): State<Arc<QueueController>>,
        request: Result<Json<ProcessQueueRequest>, JsonRejection>,
    ) -> AppResult<Json<BatchSummary>> {
        let request = process_request(request)?;
        let max_items = request.max_items.unwrap_or(DEFAULT_BATCH_SIZE);
        let engine = request
            .engine
            .unwrap_or_else(|| DEFAULT_ENGINE_ALIAS.to_string());

        let summary = controller.processor.process_batch(max_items, &engine).await?;
        Ok(Json(summary))
    }

    /// DELETE /api/queue/clear?status= - Remove items by status
    pub async fn clear(
        State(controller): State<Arc<QueueController>>,
        Query(query): Query<ClearQueueQuery>,
    ) -> AppResult<Json<ClearQueueResponse>> {
        let raw = query.status.as_deref().ok_or_else(|| {
            AppError::BadRequest(
                "status is required: pending, processing, completed, failed or all".to_string(),
            )
        })?;
        let status = parse_status_filter(Some(raw))?;

        let removed = controller.queue_service.clear(status).await;
        Ok(Json(ClearQueueResponse { removed }))
    }

    /// POST /api/queue/retry - Re-enqueue failed items under new ids
    pub async fn retry_failed(
        State(controller): State<Arc<QueueController>>,
    ) -> AppResult<Json<RetryResponse>> {
        let queue_ids = controller.queue_service.retry_failed().await;
        Ok(Json(RetryResponse { queue_ids }))
    }

    /// POST /api/queue/items/{id}/retry - Re-enqueue one failed item
    pub async fn retry_item(
        State(controller): State<Arc<QueueController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<Json<RetryResponse>> {
        let retry_id = controller.queue_service.retry_item(id).await?;
        Ok(Json(RetryResponse {
            queue_ids: vec![retry_id],
        }))
    }
}

/// A bodiless POST runs a default pass; any other malformed body is rejected.
fn process_request(
    request: Result<Json<ProcessQueueRequest>, JsonRejection>,
) -> AppResult<ProcessQueueRequest> {
    match request {
        Ok(Json(request)) => Ok(request),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(ProcessQueueRequest::default()),
        Err(rejection) => Err(AppError::BadRequest(format!(
            "invalid process request: {}",
            rejection.body_text()
        ))),
    }
}

/// `None` and `all` select every status.
fn parse_status_filter(raw: Option<&str>) -> AppResult<Option<StatusKind>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => s.parse::<StatusKind>().map(Some).map_err(AppError::BadRequest),
    }
}
