//! HTTP error mapping for the gateway.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::ClassifierError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body did not have the expected shape.
    #[error("{0}")]
    BadRequest(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Error response body: `{"error": {"code", "message"}}`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Classifier(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Classifier(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Classifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::Classifier(e) if e.is_client_error() => "INVALID_INPUT",
            ApiError::Classifier(e) if e.is_unavailable() => "MODEL_UNAVAILABLE",
            ApiError::Classifier(_) => "MODEL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
