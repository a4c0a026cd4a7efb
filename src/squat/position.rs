use crate::squat::types::FaceSample;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PositionError {
    #[error("frame dimensions must be positive, got {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },
    #[error("vertical ratio is not finite: {0}")]
    NonFinite(f64),
}

/// Vertical position of the face centre within the frame: 0.0 is the top edge,
/// 1.0 the bottom edge. Not clamped; boxes past the frame edges give values
/// outside [0, 1].
pub fn vertical_ratio(face: &FaceSample) -> Result<f64, PositionError> {
    if face.frame_width == 0 || face.frame_height == 0 {
        return Err(PositionError::EmptyFrame {
            width: face.frame_width,
            height: face.frame_height,
        });
    }
    let ratio = face.center_y() as f64 / f64::from(face.frame_height);
    if !ratio.is_finite() {
        return Err(PositionError::NonFinite(ratio));
    }
    Ok(ratio)
}
