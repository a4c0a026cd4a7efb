use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::detect::DetectError;
use crate::squat::WatchError;
use crate::store::StoreError;
use crate::validation::FrameError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    fn operational(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn bad_request(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::operational(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn payload_too_large(message: &str) -> Self {
        Self::operational(StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", message)
    }

    pub fn too_many_requests(message: &str) -> Self {
        Self::operational(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", message)
    }

    pub fn bad_gateway(message: &str) -> Self {
        Self::operational(StatusCode::BAD_GATEWAY, "DETECTOR_UNAVAILABLE", message)
    }

    pub fn gateway_timeout(message: &str) -> Self {
        Self::operational(StatusCode::GATEWAY_TIMEOUT, "DETECTOR_TIMEOUT", message)
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            is_operational: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let exposed_message = if self.is_operational {
            self.message.clone()
        } else {
            "Internal server error".to_string()
        };

        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        (
            self.status,
            Json(ErrorBody {
                success: false,
                code: self.code,
                message: exposed_message,
                trace_id: None,
            }),
        )
            .into_response()
    }
}

// Store failures are never caused by the caller; their message stays server-side.
impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        AppError::internal(&value.to_string())
    }
}

impl From<FrameError> for AppError {
    fn from(value: FrameError) -> Self {
        match value {
            FrameError::TooLarge { .. } => AppError::payload_too_large(&value.to_string()),
            _ => AppError::bad_request("INVALID_FRAME", &value.to_string()),
        }
    }
}

impl From<DetectError> for AppError {
    fn from(value: DetectError) -> Self {
        match &value {
            DetectError::InvalidFrame(msg) => AppError::bad_request("INVALID_FRAME", msg),
            DetectError::Timeout => AppError::gateway_timeout(&value.to_string()),
            DetectError::Unavailable(_) | DetectError::Protocol(_) => {
                AppError::bad_gateway(&value.to_string())
            }
        }
    }
}

impl From<WatchError> for AppError {
    fn from(value: WatchError) -> Self {
        match value {
            WatchError::Detect(e) => e.into(),
            WatchError::Store(e) => e.into(),
            WatchError::InvalidSample(msg) => AppError::bad_request("INVALID_FRAME", &msg),
            WatchError::Timeout(limit) => {
                AppError::gateway_timeout(&format!("frame step exceeded {limit:?}"))
            }
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}
