//! API error types with JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use review_core::{GatewayError, ReviewError};
use serde::{Deserialize, Serialize};

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Analysis pipeline error.
    #[error(transparent)]
    Review(#[from] ReviewError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Review(e) => e.code(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Review(e) => match e {
                ReviewError::EmptyInput | ReviewError::BinaryInput => StatusCode::BAD_REQUEST,
                ReviewError::Upstream(GatewayError::RateLimited(_)) => {
                    StatusCode::TOO_MANY_REQUESTS
                }
                ReviewError::Upstream(GatewayError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
                ReviewError::Upstream(GatewayError::Unavailable(_)) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                ReviewError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
                ReviewError::DatasetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    /// Message shown to clients. Raw upstream output is never included.
    pub fn message(&self) -> String {
        match self {
            Self::Review(e) if e.is_transient() => format!("{e}; please try again"),
            Self::Review(ReviewError::MalformedResponse { reason, .. }) => {
                format!("analysis failed: {reason}")
            }
            other => other.to_string(),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "EMPTY_INPUT", "UPSTREAM_TIMEOUT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(code = self.code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code().to_string(),
                message: self.message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
