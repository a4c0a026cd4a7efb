//! Squat phase state machine.
//!
//! The head's vertical ratio is classified against two thresholds. A ratio at
//! or above [`TOP_RATIO`] means the head is low (squatting); at or below
//! [`BOTTOM_RATIO`] it is high (upright). Between them lies a dead band where
//! no threshold is crossed, so jitter around one threshold cannot flap the
//! state.
//!
//! Standing → GoingDown → Bottom → GoingUp → Standing completes one rep, and
//! the rep is reported only on the final GoingUp → Standing edge.

use crate::squat::position::{vertical_ratio, PositionError};
use crate::squat::types::{DetectState, FaceSample, Judgement};

/// Ratio at or above which the head counts as deep.
pub const TOP_RATIO: f64 = 0.7;
/// Ratio at or below which the head counts as up.
pub const BOTTOM_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: DetectState,
    pub rep_completed: bool,
}

impl Transition {
    fn to(state: DetectState) -> Self {
        Self {
            state,
            rep_completed: false,
        }
    }
}

pub fn transition(prev: DetectState, ratio: f64) -> Transition {
    let deep = ratio >= TOP_RATIO;
    let shallow = ratio <= BOTTOM_RATIO;

    match prev {
        DetectState::Unknown | DetectState::Standing => {
            if deep {
                Transition::to(DetectState::GoingDown)
            } else {
                Transition::to(DetectState::Standing)
            }
        }
        DetectState::GoingDown => {
            if deep {
                Transition::to(DetectState::Bottom)
            } else if shallow {
                // Dipped but never reached the bottom.
                Transition::to(DetectState::Standing)
            } else {
                Transition::to(DetectState::GoingDown)
            }
        }
        DetectState::Bottom => {
            if shallow {
                Transition::to(DetectState::GoingUp)
            } else {
                Transition::to(DetectState::Bottom)
            }
        }
        DetectState::GoingUp => {
            if shallow {
                Transition {
                    state: DetectState::Standing,
                    rep_completed: true,
                }
            } else if deep {
                Transition::to(DetectState::GoingDown)
            } else {
                Transition::to(DetectState::GoingUp)
            }
        }
    }
}

/// Judge one face against the previous state. Returns the judgement together
/// with the ratio it was computed from.
pub fn judge(face: &FaceSample, prev: DetectState) -> Result<(Judgement, f64), PositionError> {
    let ratio = vertical_ratio(face)?;
    let next = transition(prev, ratio);
    let judgement = Judgement {
        timestamp: face.timestamp,
        state: next.state,
        is_rep_completed: next.rep_completed,
    };
    Ok((judgement, ratio))
}
