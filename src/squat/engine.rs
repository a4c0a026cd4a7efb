use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::detect::{DetectError, FaceDetector};
use crate::squat::judger::judge;
use crate::squat::types::{DetectState, Detection, JudgedFrame, Judgement, WatchOutput};
use crate::store::{JudgementStore, StoreError};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid face sample: {0}")]
    InvalidSample(String),
    #[error("frame step exceeded {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub judgements: u64,
    pub reps: u64,
    pub state: DetectState,
    pub last_judged_at: Option<DateTime<Utc>>,
}

/// Per-session watch-squat driver.
///
/// One frame is judged at a time: the step guard is held from detection to
/// the append, so `last → judge → save` cannot interleave with another frame.
/// The history is only written after a judgement is fully computed, so a step
/// that fails or is dropped midway leaves it untouched.
pub struct SquatEngine {
    session_id: Uuid,
    detector: Arc<dyn FaceDetector>,
    store: Arc<dyn JudgementStore>,
    step_guard: Mutex<()>,
    reps: AtomicU64,
    frame_timeout: Duration,
    events: broadcast::Sender<JudgedFrame>,
}

impl SquatEngine {
    pub fn new(
        session_id: Uuid,
        detector: Arc<dyn FaceDetector>,
        store: Arc<dyn JudgementStore>,
        frame_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let reps = store.rep_count()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            session_id,
            detector,
            store,
            step_guard: Mutex::new(()),
            reps: AtomicU64::new(reps),
            frame_timeout,
            events,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn detector(&self) -> &dyn FaceDetector {
        self.detector.as_ref()
    }

    pub fn store(&self) -> &dyn JudgementStore {
        self.store.as_ref()
    }

    pub fn total_reps(&self) -> u64 {
        self.reps.load(Ordering::Relaxed)
    }

    /// Judged frames, in order. Slow subscribers lag and skip frames.
    pub fn subscribe(&self) -> broadcast::Receiver<JudgedFrame> {
        self.events.subscribe()
    }

    #[tracing::instrument(skip_all, err(level = "warn"), fields(session_id = %self.session_id, bytes = frame.len()))]
    pub async fn watch_squat(
        &self,
        frame: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<WatchOutput, WatchError> {
        let _step = self.step_guard.lock().await;

        let detection = tokio::time::timeout(self.frame_timeout, self.detector.detect(frame, timestamp))
            .await
            .map_err(|_| WatchError::Timeout(self.frame_timeout))??;

        let face = match detection {
            Detection::Face(face) => face,
            Detection::NotFound => {
                tracing::trace!("No face in frame");
                return Ok(WatchOutput::NoFace);
            }
        };

        let prev = self
            .store
            .last()?
            .map(|judgement| judgement.state)
            .unwrap_or(DetectState::Unknown);

        let (judgement, ratio) =
            judge(&face, prev).map_err(|e| WatchError::InvalidSample(e.to_string()))?;

        self.store.save(&judgement)?;

        let total_reps = if judgement.is_rep_completed {
            self.on_rep_completed(&judgement)
        } else {
            self.total_reps()
        };

        tracing::debug!(
            prev = prev.label(),
            next = judgement.state.label(),
            ratio,
            "Frame judged"
        );

        let judged = JudgedFrame {
            face,
            judgement,
            ratio,
            total_reps,
        };
        // No subscribers is fine.
        let _ = self.events.send(judged.clone());

        Ok(WatchOutput::Judged(judged))
    }

    pub fn last_judgement(&self) -> Result<Option<Judgement>, StoreError> {
        self.store.last()
    }

    pub fn summary(&self) -> Result<SessionSummary, StoreError> {
        let last = self.store.last()?;
        Ok(SessionSummary {
            session_id: self.session_id,
            judgements: self.store.len()?,
            reps: self.total_reps(),
            state: last.as_ref().map(|j| j.state).unwrap_or_default(),
            last_judged_at: last.map(|j| j.timestamp),
        })
    }

    fn on_rep_completed(&self, judgement: &Judgement) -> u64 {
        let total = self.reps.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            session_id = %self.session_id,
            total_reps = total,
            at = %judgement.timestamp,
            "Rep completed"
        );
        total
    }
}
