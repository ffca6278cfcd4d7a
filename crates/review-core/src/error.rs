//! Error taxonomy for a single analysis request.
//!
//! Every failure here is scoped to the in-flight request. Field-level data
//! quality problems in an otherwise parseable upstream response are not
//! errors at all; they are repaired and flagged on the result.

use thiserror::Error;

/// Result type alias for analysis operations.
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Network-class failures of the outbound language-service call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Connection or authentication failure. Not retried.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the configured timeout.
    #[error("upstream timed out: {0}")]
    Timeout(String),

    /// The provider rejected the call due to rate limiting.
    #[error("upstream rate limited: {0}")]
    RateLimited(String),
}

impl GatewayError {
    /// Whether the retry policy may re-send the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::RateLimited(_))
    }
}

/// Errors surfaced to callers of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// Review text was empty after trimming.
    #[error("review text is empty")]
    EmptyInput,

    /// Review text contained NUL or other control bytes.
    #[error("review text contains binary data")]
    BinaryInput,

    /// The language service could not be reached.
    #[error(transparent)]
    Upstream(#[from] GatewayError),

    /// The language service returned no parseable structure. The raw text is
    /// retained for diagnostics.
    #[error("malformed upstream response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    /// The reference corpus could not be loaded.
    #[error("dataset unavailable: {0}")]
    DatasetUnavailable(String),
}

impl ReviewError {
    /// Stable error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "EMPTY_INPUT",
            Self::BinaryInput => "BINARY_INPUT",
            Self::Upstream(GatewayError::Unavailable(_)) => "UPSTREAM_UNAVAILABLE",
            Self::Upstream(GatewayError::Timeout(_)) => "UPSTREAM_TIMEOUT",
            Self::Upstream(GatewayError::RateLimited(_)) => "UPSTREAM_RATE_LIMITED",
            Self::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            Self::DatasetUnavailable(_) => "DATASET_UNAVAILABLE",
        }
    }

    /// Whether the user can fix the problem by changing their input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::BinaryInput)
    }

    /// Whether the caller should suggest trying again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }

    /// Builds a `MalformedResponse` error.
    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}
