use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::response::{ok, AppError};
use crate::squat::WatchOutput;
use crate::state::AppState;
use crate::validation::{decode_frame_body, validate_frame};
use crate::view::FrameView;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(receive_frame))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameQuery {
    /// Capture time in epoch milliseconds; receipt time when absent.
    pub captured_at: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResult {
    pub detected: bool,
    pub frame: Option<FrameView>,
}

pub async fn receive_frame(
    State(state): State<AppState>,
    Query(query): Query<FrameQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let frame = decode_frame_body(&body)?;
    validate_frame(&frame, state.config().limits.max_frame_bytes)?;

    let timestamp = match query.captured_at {
        Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or_else(|| AppError::bad_request("INVALID_TIMESTAMP", "capturedAt out of range"))?,
        None => Utc::now(),
    };

    let view = match state.engine().watch_squat(&frame, timestamp).await? {
        WatchOutput::NoFace => None,
        WatchOutput::Judged(judged) => Some(FrameView::from(&judged)),
    };

    Ok(ok(FrameResult {
        detected: view.is_some(),
        frame: view,
    }))
}
