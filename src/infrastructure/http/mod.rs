use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::controllers::{health, queue::QueueController, stats::StatsController};
use crate::domain::tts::TtsService;
use crate::infrastructure::config::Config;
use crate::infrastructure::request_id::request_id_middleware;

/// Build the application router with every route and layer
pub fn build_router(
    tts_service: Arc<TtsService>,
    queue_controller: Arc<QueueController>,
    stats_controller: Arc<StatsController>,
) -> Router {
    let queue_routes = Router::new()
        .route("/api/queue/add", post(QueueController::add))
        .route("/api/queue/status", get(QueueController::status))
        .route("/api/queue/items", get(QueueController::list_items))
        .route("/api/queue/items/:id", get(QueueController::get_item))
        .route("/api/queue/items/:id/retry", post(QueueController::retry_item))
        .route("/api/queue/process", post(QueueController::process))
        .route("/api/queue/clear", delete(QueueController::clear))
        .route("/api/queue/retry", post(QueueController::retry_failed))
        .with_state(queue_controller);

    let stats_routes = Router::new()
        .route("/api/stats/summary", get(StatsController::summary))
        .route("/api/stats/queue", get(StatsController::queue))
        .with_state(stats_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(tts_service)
        .merge(queue_routes)
        .merge(stats_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` until `shutdown` is cancelled, then drain open connections
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
