//! Failure taxonomy of the generation endpoint.

use crate::services::generator::GenerationError;
use crate::services::storage::StorageError;
use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Every way a `POST /generate-3d` request can fail.
///
/// The display text of each variant is exactly what the caller sees in the
/// `error` field, so wrapped errors are shown without a prefix.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("No JSON data provided")]
    BadRequest,

    /// The body could not be read, e.g. it exceeds the size limit.
    #[error("{}", .0.body_text())]
    Body(#[from] BytesRejection),

    #[error("{0}")]
    ValueConversion(String),

    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("{0}")]
    Upload(#[from] StorageError),

    #[error("{0}")]
    Filesystem(#[from] std::io::Error),

    #[error("generation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl GenerateError {
    /// Stable label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerateError::BadRequest => "bad_request",
            GenerateError::Body(_) => "body",
            GenerateError::ValueConversion(_) => "value_conversion",
            GenerateError::Generation(_) => "generation",
            GenerateError::Upload(_) => "upload",
            GenerateError::Filesystem(_) => "filesystem",
            GenerateError::Task(_) => "task",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GenerateError::BadRequest => StatusCode::BAD_REQUEST,
            GenerateError::Body(rejection) => rejection.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_is_400_with_fixed_message() {
        let response = GenerateError::BadRequest.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "No JSON data provided"})
        );
    }

    #[tokio::test]
    async fn wrapped_failures_are_500_with_raw_message() {
        let err = GenerateError::from(GenerationError::Failed("CUDA out of memory".to_string()));
        assert_eq!(err.kind(), "generation");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "CUDA out of memory"})
        );
    }

    #[test]
    fn io_errors_are_filesystem_failures() {
        let err = GenerateError::from(std::io::Error::other("read-only file system"));
        assert_eq!(err.kind(), "filesystem");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "read-only file system");
    }
}
