//! Frame upload checks applied before a frame reaches the detector.

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const DATA_URL_SCHEME: &[u8] = b"data:";
const BASE64_MARKER: &[u8] = b";base64,";
/// Room for the `data:image/...;base64,` header on top of the encoded payload.
const DATA_URL_HEADER_ALLOWANCE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame is empty")]
    Empty,
    #[error("frame is {len} bytes, limit is {max}")]
    TooLarge { len: usize, max: usize },
    #[error("frame is not a JPEG or PNG image")]
    UnknownFormat,
    #[error("frame data URL is not valid base64")]
    BadEncoding,
}

/// Largest request body that can still decode to a frame of `max_frame_bytes`.
pub fn body_limit(max_frame_bytes: usize) -> usize {
    max_frame_bytes.div_ceil(3) * 4 + DATA_URL_HEADER_ALLOWANCE
}

/// Raw image bytes, or a `data:<mime>;base64,<payload>` URL as sent by
/// browser canvas captures.
pub fn decode_frame_body(body: &[u8]) -> Result<Cow<'_, [u8]>, FrameError> {
    if !body.starts_with(DATA_URL_SCHEME) {
        return Ok(Cow::Borrowed(body));
    }
    let start = body
        .windows(BASE64_MARKER.len())
        .position(|w| w == BASE64_MARKER)
        .ok_or(FrameError::BadEncoding)?
        + BASE64_MARKER.len();
    let payload = &body[start..];
    let end = payload
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    let payload = &payload[..end];
    STANDARD
        .decode(payload)
        .map(Cow::Owned)
        .map_err(|_| FrameError::BadEncoding)
}

/// Reject empty, oversized, and non-JPEG/PNG payloads before they reach the detector.
pub fn validate_frame(frame: &[u8], max_bytes: usize) -> Result<ImageFormat, FrameError> {
    if frame.is_empty() {
        return Err(FrameError::Empty);
    }
    if frame.len() > max_bytes {
        return Err(FrameError::TooLarge {
            len: frame.len(),
            max: max_bytes,
        });
    }
    sniff_format(frame).ok_or(FrameError::UnknownFormat)
}

pub fn sniff_format(frame: &[u8]) -> Option<ImageFormat> {
    if frame.starts_with(JPEG_MAGIC) {
        Some(ImageFormat::Jpeg)
    } else if frame.starts_with(PNG_MAGIC) {
        Some(ImageFormat::Png)
    } else {
        None
    }
}
