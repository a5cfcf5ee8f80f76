use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use facefind_core::MatchError;

use crate::engine::EngineError;

/// Request-level errors, split so callers can tell "your photo had no face"
/// apart from "there is nothing to search yet".
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request must include a `file` field with the image")]
    MissingFile,
    #[error("uploaded file is not a decodable image")]
    BadImage,
    #[error("no face detected in the uploaded image")]
    NoFaceDetected,
    #[error("the photo index is empty — no embeddings have been built yet")]
    EmptyStore,
    #[error("query embedding does not match the index: {0}")]
    QueryMismatch(MatchError),
    #[error("face analysis timed out")]
    Timeout,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::BadImage | ApiError::NoFaceDetected => {
                StatusCode::BAD_REQUEST
            }
            ApiError::QueryMismatch(_) => StatusCode::BAD_REQUEST,
            ApiError::EmptyStore => StatusCode::CONFLICT,
            ApiError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal detail goes to the log, never to the client.
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "request failed");
            "internal error".to_string()
        } else {
            tracing::debug!(error = %self, "request rejected");
            self.to_string()
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Internal(err.into())
    }
}

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::DimensionMismatch { .. } => ApiError::QueryMismatch(err),
            other => ApiError::Internal(other.into()),
        }
    }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NoFaceDetected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmptyStore.status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Timeout.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_dimension_mismatch_is_client_error() {
        let err: ApiError = MatchError::DimensionMismatch { query: 3, store: 2 }.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
