//! Liveness and readiness probes

use crate::{
    db::{self, HealthStatus},
    middleware::AppState,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::{
    sync::OnceLock,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Record process start; call once during startup
pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

fn uptime_secs() -> u64 {
    START_TIME.get().map(|s| s.elapsed().as_secs()).unwrap_or(0)
}

/// GET /health — process is up, no dependency checks
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "uptime_secs": uptime_secs(),
        "timestamp": SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
    }))
}

/// GET /ready — database reachable
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match db::health_check(&state.db).await {
        HealthStatus::Healthy => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "database": "ok" })),
        ),
        HealthStatus::Unhealthy(reason) => {
            tracing::warn!(reason = %reason, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "not_ready", "database": reason })),
            )
        }
    }
}
