//! Error types for the PDF toolkit server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdftoolkit_core::ToolkitError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("No input files provided")]
    NoInput,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No embedded images found in PDF")]
    NoImages,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::NoInput => (StatusCode::UNPROCESSABLE_ENTITY, "NO_INPUT"),
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServerError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ServerError::InvalidDocument(_) => (StatusCode::BAD_REQUEST, "INVALID_DOCUMENT"),
            ServerError::UnsupportedFormat(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FORMAT")
            }
            ServerError::NoImages => (StatusCode::UNPROCESSABLE_ENTITY, "NO_IMAGES"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            error!(code = code, "{}", self);
        } else {
            warn!(code = code, "{}", self);
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ToolkitError> for ServerError {
    fn from(err: ToolkitError) -> Self {
        match err {
            ToolkitError::NoInput => ServerError::NoInput,
            ToolkitError::NoImages => ServerError::NoImages,
            ToolkitError::UnsupportedFormat(msg) => ServerError::UnsupportedFormat(msg),
            ToolkitError::InvalidInput(msg) => ServerError::InvalidRequest(msg),
            err @ (ToolkitError::ParseError(_) | ToolkitError::ConversionError(_)) => {
                ServerError::InvalidDocument(err.to_string())
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        let message = format!("Failed to read multipart field: {}", err);
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(message)
        } else {
            ServerError::InvalidRequest(message)
        }
    }
}
