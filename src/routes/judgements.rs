use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/last", get(last_judgement))
}

pub async fn last_judgement(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let judgement = state
        .engine()
        .last_judgement()?
        .ok_or_else(|| AppError::not_found("No judgement recorded yet"))?;
    Ok(ok(judgement))
}

pub async fn session_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.engine().summary()?))
}
