use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::domain::tts::{EnginesResponse, TtsService, TtsServiceApi};

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Ready once at least one speech engine is registered and the default resolves.
pub async fn health_ready(State(tts_service): State<Arc<TtsService>>) -> impl IntoResponse {
    let engines = EnginesResponse {
        default_engine: tts_service.default_engine(),
        engines: tts_service.engine_names(),
    };
    let default_resolves = tts_service.resolve_engine(&engines.default_engine).is_some();

    if default_resolves {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "tts": engines,
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "not_ready",
                "tts": engines,
            })),
        )
    }
}
