//! Translation of service error kinds to HTTP responses.
//!
//! This is the only place status codes are assigned; the service layer deals
//! purely in tagged error kinds.

use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};

use crate::auth::AuthError;
use crate::service::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("forbidden: {0}")]
    Forbidden(#[from] AuthError),
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Forbidden(_) => (http::StatusCode::FORBIDDEN, "Forbidden").into_response(),
            ApiError::Multipart(err) => (
                http::StatusCode::BAD_REQUEST,
                format!("Bad request: {}", err),
            )
                .into_response(),
            ApiError::Service(err) => match err {
                ServiceError::InvalidInput(msg) => {
                    (http::StatusCode::BAD_REQUEST, format!("Bad request: {}", msg))
                        .into_response()
                }
                ServiceError::Conflict(id) => (
                    http::StatusCode::CONFLICT,
                    format!("Identifier already in use: {}", id),
                )
                    .into_response(),
                ServiceError::NotFound(_) => {
                    (http::StatusCode::NOT_FOUND, "Not Found").into_response()
                }
                err @ (ServiceError::Io(_) | ServiceError::Internal(_)) => {
                    tracing::error!("request failed: {err}");
                    (
                        http::StatusCode::INTERNAL_SERVER_ERROR,
                        "Unexpected error".to_string(),
                    )
                        .into_response()
                }
            },
        }
    }
}
