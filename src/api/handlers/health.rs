//! Health check handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub cache: &'static str,
    pub click_queue: ClickQueueHealth,
}

#[derive(Serialize)]
pub struct ClickQueueHealth {
    pub capacity: usize,
    pub available: usize,
}

/// Reports service health: storage reachability, cache reachability, and
/// click queue headroom.
///
/// # Endpoint
///
/// `GET /health` returns 200 when storage is reachable, 503 otherwise. A
/// degraded cache does not fail the check (redirects fall back to storage).
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = state.stats_service.global_counts().await.is_ok();
    let cache_ok = state.cache.health_check().await;

    let click_queue = ClickQueueHealth {
        capacity: state.click_sender.max_capacity(),
        available: state.click_sender.capacity(),
    };

    let (status, overall) = if database_ok {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: overall,
            database: if database_ok { "ok" } else { "unreachable" },
            cache: if cache_ok { "ok" } else { "unreachable" },
            click_queue,
        }),
    )
}
