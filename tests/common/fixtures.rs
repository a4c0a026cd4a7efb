use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

use squat_tracker::detect::{DetectError, FaceDetector};
use squat_tracker::squat::{BoundingBox, Detection, FaceSample};

pub const FRAME_HEIGHT: u32 = 1000;

/// Minimal JPEG header; the scripted detector never decodes it.
pub fn jpeg_frame() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00]
}

/// A face whose centre sits at `ratio` of a 1000px-high frame.
pub fn face_at(ratio: f64) -> Detection {
    let height = 100_u32;
    let center = (ratio * f64::from(FRAME_HEIGHT)).round() as i32;
    Detection::Face(FaceSample::new(
        Utc::now(),
        BoundingBox {
            x: 200,
            y: center - (height / 2) as i32,
            width: 100,
            height,
        },
        800,
        FRAME_HEIGHT,
    ))
}

/// Detector that replays scripted outcomes in order, then reports no face.
#[derive(Default)]
pub struct ScriptedDetector {
    steps: Mutex<VecDeque<Result<Detection, DetectError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(steps: Vec<Result<Detection, DetectError>>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_ratios(ratios: &[f64]) -> Self {
        Self::new(ratios.iter().map(|r| Ok(face_at(*r))).collect())
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push(&self, step: Result<Detection, DetectError>) {
        self.steps.lock().expect("steps lock").push_back(step);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FaceDetector for ScriptedDetector {
    fn detect<'a>(
        &'a self,
        _frame: &'a [u8],
        timestamp: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Detection, DetectError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let step = self
                .steps
                .lock()
                .expect("steps lock")
                .pop_front()
                .unwrap_or(Ok(Detection::NotFound));
            step.map(|detection| match detection {
                Detection::Face(mut face) => {
                    face.timestamp = timestamp;
                    Detection::Face(face)
                }
                Detection::NotFound => Detection::NotFound,
            })
        })
    }
}
