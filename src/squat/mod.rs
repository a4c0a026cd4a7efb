pub mod engine;
pub mod judger;
pub mod position;
pub mod types;

pub use engine::{SessionSummary, SquatEngine, WatchError};
pub use judger::{transition, Transition, BOTTOM_RATIO, TOP_RATIO};
pub use types::{
    BoundingBox, DetectState, Detection, FaceSample, JudgedFrame, Judgement, WatchOutput,
};
