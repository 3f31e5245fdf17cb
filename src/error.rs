//! Error types for the PDF OCR server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::pipeline::PipelineError;
use crate::storage::{LocationError, ObjectLocation};

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Request-level error
///
/// Every variant is terminal for the request; none is retried.
#[derive(Error, Debug)]
pub enum AppError {
    /// The request itself is unusable
    #[error("{0}")]
    Validation(String),

    /// Fetching the input from storage failed
    #[error("Failed to download file from S3: {source} at {location}")]
    SourceUnavailable {
        location: ObjectLocation,
        #[source]
        source: StorageError,
    },

    /// Classification, OCR or container work failed
    #[error("Failed to process PDF: {0}")]
    Processing(#[from] PipelineError),

    /// Uploading the processed output failed
    #[error("Failed to upload processed file to S3: {source} at {location}")]
    SinkUnavailable {
        location: ObjectLocation,
        #[source]
        source: StorageError,
    },
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LocationError> for AppError {
    fn from(e: LocationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 SDK error: {0}")]
    SdkError(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}
