use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::DetectorConfig;
use crate::detect::{DetectError, FaceDetector};
use crate::squat::types::{BoundingBox, Detection, FaceSample};

/// Client for the face-detection helper that serves `POST /detect` and
/// `GET /health` over HTTP.
#[derive(Debug, Clone)]
pub struct MediaPipeDetector {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    x: i64,
    #[serde(default)]
    y: i64,
    #[serde(default)]
    width: i64,
    #[serde(default)]
    height: i64,
    #[serde(default)]
    frame_width: i64,
    #[serde(default)]
    frame_height: i64,
}

impl MediaPipeDetector {
    pub fn new(config: &DetectorConfig) -> Result<Self, DetectError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DetectError::Unavailable(format!("build http client: {e}")))?;
        Ok(Self {
            base_url: config.server_url(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Poll `/health` until it answers 200, up to `retries` attempts.
    pub async fn wait_until_healthy(
        &self,
        retries: u32,
        interval: Duration,
    ) -> Result<(), DetectError> {
        let mut last_err = DetectError::Unavailable("no health probe attempted".to_string());
        for attempt in 1..=retries.max(1) {
            match self.probe().await {
                Ok(()) => {
                    tracing::info!(attempt, url = %self.base_url, "Face detector is ready");
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "Face detector not ready yet");
                    last_err = e;
                }
            }
            if attempt < retries {
                tokio::time::sleep(interval).await;
            }
        }
        Err(last_err)
    }

    async fn probe(&self) -> Result<(), DetectError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(map_transport_error)?;
        if resp.status() != StatusCode::OK {
            return Err(DetectError::Unavailable(format!(
                "health check returned {}",
                resp.status().as_u16()
            )));
        }
        Ok(())
    }

    async fn detect_remote(
        &self,
        frame: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<Detection, DetectError> {
        if frame.is_empty() {
            return Err(DetectError::InvalidFrame("empty frame".to_string()));
        }

        let resp = self
            .client
            .post(format!("{}/detect", self.base_url))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(frame.to_vec())
            .send()
            .await
            .map_err(map_transport_error)?;

        // The helper answers non-200 when the image holds no face.
        if resp.status() != StatusCode::OK {
            tracing::debug!(status = resp.status().as_u16(), "Detector reported no face");
            return Ok(Detection::NotFound);
        }

        let body: DetectResponse = resp
            .json()
            .await
            .map_err(|e| DetectError::Protocol(format!("decode json: {e}")))?;

        body.into_detection(timestamp)
    }
}

impl DetectResponse {
    fn into_detection(self, timestamp: DateTime<Utc>) -> Result<Detection, DetectError> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Ok(Detection::NotFound);
        }
        let to_u32 = |name: &str, v: i64| {
            u32::try_from(v).map_err(|_| DetectError::Protocol(format!("{name} out of range: {v}")))
        };
        let to_i32 = |name: &str, v: i64| {
            i32::try_from(v).map_err(|_| DetectError::Protocol(format!("{name} out of range: {v}")))
        };

        let bbox = BoundingBox {
            x: to_i32("x", self.x)?,
            y: to_i32("y", self.y)?,
            width: to_u32("width", self.width)?,
            height: to_u32("height", self.height)?,
        };
        Ok(Detection::Face(FaceSample::new(
            timestamp,
            bbox,
            to_u32("frame_width", self.frame_width)?,
            to_u32("frame_height", self.frame_height)?,
        )))
    }
}

fn map_transport_error(e: reqwest::Error) -> DetectError {
    if e.is_timeout() {
        DetectError::Timeout
    } else {
        DetectError::Unavailable(e.to_string())
    }
}

impl FaceDetector for MediaPipeDetector {
    fn detect<'a>(
        &'a self,
        frame: &'a [u8],
        timestamp: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Detection, DetectError>> {
        Box::pin(self.detect_remote(frame, timestamp))
    }

    fn health(&self) -> BoxFuture<'_, Result<(), DetectError>> {
        Box::pin(self.probe())
    }
}
