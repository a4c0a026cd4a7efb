pub mod frames;
pub mod health;
pub mod judgements;
pub mod realtime;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::validation::body_limit;

pub fn build_router(state: AppState) -> Router {
    // Frame size is enforced after decoding so oversized frames get a JSON error.
    let max_body_bytes = body_limit(state.config().limits.max_frame_bytes);

    let api_routes = Router::new()
        .nest("/frames", frames::router())
        .nest("/judgements", judgements::router())
        .nest("/realtime", realtime::router())
        .route("/stats", get(judgements::session_stats))
        .layer(DefaultBodyLimit::max(max_body_bytes));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .with_state(state)
}
