use axum::{extract::State, Json};
use std::sync::Arc;

use crate::domain::queue::QueueBreakdown;
use crate::domain::stats::{StatsService, StatsServiceApi, StatsSummary};
use crate::error::AppResult;

pub struct StatsController {
    stats_service: Arc<StatsService>,
}

impl StatsController {
    pub fn new(stats_service: Arc<StatsService>) -> Self {
        Self { stats_service }
    }

    /// GET /api/stats/summary - Artifact totals and averages
    pub async fn summary(
        State(controller): State<Arc<StatsController>>,
    ) -> AppResult<Json<StatsSummary>> {
        Ok(Json(controller.stats_service.summary().await))
    }

    /// GET /api/stats/queue - Status counts with breakdowns
    pub async fn queue(
        State(controller): State<Arc<StatsController>>,
    ) -> AppResult<Json<QueueBreakdown>> {
        Ok(Json(controller.stats_service.queue_breakdown().await))
    }
}
