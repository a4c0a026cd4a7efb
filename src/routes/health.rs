use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/detector", get(detector_health))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.engine().store().len().is_ok();
    Json(serde_json::json!({
        "status": "ok",
        "uptimeSecs": state.uptime_secs(),
        "sessionId": state.engine().session_id(),
        "store": {
            "healthy": store_healthy,
        }
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

pub async fn detector_health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let result = state.engine().detector().health().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let status = if result.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(serde_json::json!({
            "healthy": result.is_ok(),
            "latencyMs": latency_ms,
            "error": result.err().map(|e| e.to_string()),
        })),
    )
}
