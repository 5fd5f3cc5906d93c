//! Tag classifier error types

use std::time::Duration;

/// Errors produced while classifying tags.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    // Caller errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Model errors
    /// The classification capability failed or returned a malformed distribution.
    #[error("model error: {0}")]
    Model(String),

    #[error("empty response from model")]
    EmptyResponse,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("data error: {0}")]
    DataError(String),

    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClassifierError {
    /// Whether the caller caused this error (bad tags or categories).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Whether the model backend is temporarily unable to serve requests.
    ///
    /// Failures are never retried; this only selects the response status.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Api { status: 503, .. }
        )
    }
}

/// Result type alias for tag classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;
