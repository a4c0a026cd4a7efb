use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::squat::types::JudgedFrame;

/// Per-frame payload pushed to the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameView {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub ratio: f64,
    pub state: &'static str,
    pub rep_completed: bool,
    pub total_reps: u64,
    pub timestamp: DateTime<Utc>,
}

impl From<&JudgedFrame> for FrameView {
    fn from(frame: &JudgedFrame) -> Self {
        let face = &frame.face;
        Self {
            x: face.bbox.x,
            y: face.bbox.y,
            width: face.bbox.width,
            height: face.bbox.height,
            frame_width: face.frame_width,
            frame_height: face.frame_height,
            ratio: frame.ratio,
            state: frame.judgement.state.label(),
            rep_completed: frame.judgement.is_rep_completed,
            total_reps: frame.total_reps,
            timestamp: frame.judgement.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squat::types::{BoundingBox, DetectState, FaceSample, Judgement};

    #[test]
    fn view_uses_camel_case_and_labels() {
        let ts = Utc::now();
        let frame = JudgedFrame {
            face: FaceSample::new(
                ts,
                BoundingBox {
                    x: 1,
                    y: 2,
                    width: 3,
                    height: 4,
                },
                640,
                480,
            ),
            judgement: Judgement {
                timestamp: ts,
                state: DetectState::GoingUp,
                is_rep_completed: false,
            },
            ratio: 0.55,
            total_reps: 3,
        };
        let json = serde_json::to_value(FrameView::from(&frame)).unwrap();
        assert_eq!(json["state"], "going_up");
        assert_eq!(json["frameHeight"], 480);
        assert_eq!(json["repCompleted"], false);
        assert_eq!(json["totalReps"], 3);
    }
}
