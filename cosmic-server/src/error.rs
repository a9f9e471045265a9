//! Error types for cosmic-server
//!
//! Every handler error renders as `{"error": message, "code": CODE}` with
//! the matching status.

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cosmic_media::MediaError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Wrong credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// Malformed, mistyped or non-JSON request body
    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),

    /// Malformed multipart body
    #[error("Invalid upload body: {0}")]
    Multipart(#[from] MultipartError),

    /// Upload pipeline error
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Hosted backend or store error
    #[error(transparent)]
    Common(#[from] cosmic_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The authoritative local write carries the failing path for operators
        if let ApiError::Media(MediaError::LocalWrite { ref path, ref source }) = self {
            error!(path = %path.display(), error = %source, "Upload could not be saved locally");
            let body = Json(json!({
                "error": "Failed to save image to server",
                "code": "LOCAL_WRITE_FAILED",
                "details": source.to_string(),
                "path": path.display().to_string(),
            }));
            return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
        }

        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Json(err) => (err.status(), "INVALID_JSON"),
            ApiError::Multipart(err) => (err.status(), "INVALID_MULTIPART"),
            ApiError::Media(err) => match err {
                MediaError::UnsupportedType => (StatusCode::BAD_REQUEST, "UNSUPPORTED_TYPE"),
                MediaError::TooLarge { .. } => (StatusCode::BAD_REQUEST, "FILE_TOO_LARGE"),
                MediaError::InvalidFilename(_) => (StatusCode::BAD_REQUEST, "INVALID_FILENAME"),
                MediaError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "MEDIA_ERROR"),
            },
            ApiError::Common(err) => match err {
                cosmic_common::Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                cosmic_common::Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "BACKEND_ERROR"),
            },
        };

        if status.is_server_error() {
            error!(code, error = %self, "Request failed");
        }

        let message = match &self {
            ApiError::Media(MediaError::NotFound(_)) => "File not found".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_bad_request_shape() {
        let (status, body) = render(ApiError::BadRequest("Missing required fields".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_validation_errors_are_client_errors() {
        let (status, body) = render(MediaError::TooLarge { max_mb: 10 }.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File is too large. Maximum size is 10 MB");

        let (status, _) = render(MediaError::UnsupportedType.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_local_write_includes_path() {
        let err = MediaError::LocalWrite {
            path: "/srv/uploads/a.png".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to save image to server");
        assert_eq!(body["path"], "/srv/uploads/a.png");
        assert_eq!(body["details"], "denied");
    }

    #[tokio::test]
    async fn test_backend_error_is_server_error() {
        let err = cosmic_common::Error::Backend {
            status: 500,
            code: None,
            message: "relation does not exist".into(),
        };
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "BACKEND_ERROR");
    }
}
