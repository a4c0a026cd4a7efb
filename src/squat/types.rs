use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Detected face rectangle in pixel coordinates, origin at the top-left of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One successful detection on one video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceSample {
    pub timestamp: DateTime<Utc>,
    pub bbox: BoundingBox,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl FaceSample {
    pub fn new(
        timestamp: DateTime<Utc>,
        bbox: BoundingBox,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            timestamp,
            bbox,
            frame_width,
            frame_height,
        }
    }

    /// Integer midpoint of the box along the vertical axis.
    pub fn center_y(&self) -> i64 {
        i64::from(self.bbox.y) + i64::from(self.bbox.height / 2)
    }
}

/// Outcome of a detector call. Absence of a face is a normal result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Face(FaceSample),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectState {
    /// Only ever the implicit state before the first judgement of a session.
    #[default]
    Unknown,
    Standing,
    GoingDown,
    Bottom,
    GoingUp,
}

impl DetectState {
    pub fn label(&self) -> &'static str {
        match self {
            DetectState::Unknown => "unknown",
            DetectState::Standing => "standing",
            DetectState::GoingDown => "going_down",
            DetectState::Bottom => "bottom",
            DetectState::GoingUp => "going_up",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Judgement {
    pub timestamp: DateTime<Utc>,
    pub state: DetectState,
    pub is_rep_completed: bool,
}

/// Face and judgement produced by one frame that contained a face.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgedFrame {
    pub face: FaceSample,
    pub judgement: Judgement,
    pub ratio: f64,
    pub total_reps: u64,
}

/// Result of one watch-squat step.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchOutput {
    /// The detector saw no face; History was not touched.
    NoFace,
    Judged(JudgedFrame),
}

impl WatchOutput {
    pub fn face(&self) -> Option<&FaceSample> {
        match self {
            WatchOutput::NoFace => None,
            WatchOutput::Judged(frame) => Some(&frame.face),
        }
    }

    pub fn judgement(&self) -> Option<&Judgement> {
        match self {
            WatchOutput::NoFace => None,
            WatchOutput::Judged(frame) => Some(&frame.judgement),
        }
    }
}
