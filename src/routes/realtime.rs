use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{extract::State, Router};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::response::AppError;
use crate::state::AppState;
use crate::view::FrameView;

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(sse_handler))
}

pub async fn sse_handler(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let slot = state
        .try_acquire_sse_slot()
        .ok_or_else(|| AppError::too_many_requests("Too many realtime connections"))?;

    let mut frames = state.engine().subscribe();
    let mut shutdown_rx = state.shutdown_rx();

    let stream = async_stream::stream! {
        let _slot = slot;
        loop {
            tokio::select! {
                received = frames.recv() => {
                    match received {
                        Ok(judged) => {
                            let view = FrameView::from(&judged);
                            if let Ok(json) = serde_json::to_string(&view) {
                                yield Ok(Event::default().event("frame").data(json));
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "Realtime subscriber lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}
