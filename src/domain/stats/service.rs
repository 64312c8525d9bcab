use super::model::StatsSummary;
use crate::domain::queue::{QueueBreakdown, QueueStore, StatusCounts, StatusKind};
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only view over the queue. Never mutates the store.
pub struct StatsService {
    store: Arc<QueueStore>,
}

impl StatsService {
    pub fn new(store: Arc<QueueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
pub trait StatsServiceApi: Send + Sync {
    async fn status_counts(&self) -> StatusCounts;

    /// Artifact totals derived from the durations and sizes recorded when
    /// each artifact was stored
    async fn summary(&self) -> StatsSummary;

    async fn queue_breakdown(&self) -> QueueBreakdown;
}

#[async_trait]
impl StatsServiceApi for StatsService {
    async fn status_counts(&self) -> StatusCounts {
        self.store.counts()
    }

    async fn summary(&self) -> StatsSummary {
        let completed = self.store.list_by_status(Some(StatusKind::Completed));
        let summary = StatsSummary::from_items(&completed, self.store.processed_all_time());
        tracing::debug!(
            artifacts = summary.artifacts,
            total_duration_seconds = summary.total_duration_seconds,
            "Stats summary computed"
        );
        summary
    }

    async fn queue_breakdown(&self) -> QueueBreakdown {
        QueueBreakdown::from_items(&self.store.list_by_status(None))
    }
}
