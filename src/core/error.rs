use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    #[error("Parse failed: {0}")]
    ExtractionFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::InvalidToken(reason) => (
                StatusCode::UNAUTHORIZED,
                "Token invalid".to_string(),
                Some(reason),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "File too large".to_string(),
                Some(msg),
            ),
            AppError::UnsupportedType(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::ConversionFailed(detail) => {
                tracing::error!("Conversion failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Conversion failed".to_string(),
                    Some(detail),
                )
            }
            AppError::ExtractionFailed(detail) => {
                tracing::error!("PDF parse failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Parse failed".to_string(),
                    Some(detail),
                )
            }
            AppError::Io(ref e) => {
                tracing::error!("I/O error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error occurred".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse::new(error, detail))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unsupported_type_is_bad_request() {
        let (status, body) = render(AppError::UnsupportedType("Not a PDF".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Not a PDF");
        assert!(body.get("detail").is_none());
    }

    #[tokio::test]
    async fn test_conversion_failure_forwards_detail() {
        let (status, body) =
            render(AppError::ConversionFailed("bad PNG signature".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Conversion failed");
        assert_eq!(body["detail"], "bad PNG signature");
    }

    #[tokio::test]
    async fn test_io_error_hides_detail() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/secret");
        let (status, body) = render(AppError::from(err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.get("detail").is_none());
    }
}
