pub mod mediapipe;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

use crate::squat::types::Detection;

pub use mediapipe::MediaPipeDetector;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectError {
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("face detector timed out")]
    Timeout,
    #[error("face detector unavailable: {0}")]
    Unavailable(String),
    #[error("face detector protocol error: {0}")]
    Protocol(String),
}

/// Face detection oracle. Implementations may block on network or compute;
/// they must not touch the judgement history.
pub trait FaceDetector: Send + Sync {
    fn detect<'a>(
        &'a self,
        frame: &'a [u8],
        timestamp: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Detection, DetectError>>;

    /// Readiness probe. Detectors without a remote side are always ready.
    fn health(&self) -> BoxFuture<'_, Result<(), DetectError>> {
        Box::pin(async { Ok(()) })
    }
}
