//! Route handlers.
//!
//! - `GET /`: liveness with model id and timestamp
//! - `GET /info`: service description
//! - `POST /classify`: classify a tag list
//! - `GET /openapi.json`, `GET /docs`, `GET /redoc`: API documentation

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde_json::{Value, json};

use super::error::{ApiError, ApiResult, ErrorResponse};
use super::state::AppState;
use crate::types::{ClassificationResult, ClassifyRequest};
use crate::version::PKG_VERSION;

/// Service name reported by `GET /info`.
pub const SERVICE_NAME: &str = "Tag Classifier API";

/// Health check. Never touches the model.
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Service is up; reports model id and timestamp"))
)]
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "model": state.model(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": PKG_VERSION,
    }))
}

#[utoipa::path(
    get,
    path = "/info",
    tag = "Health",
    responses((status = 200, description = "Service name, version, model and endpoints"))
)]
pub async fn info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": SERVICE_NAME,
        "version": PKG_VERSION,
        "model": state.model(),
        "endpoints": {
            "/": "Health check",
            "/info": "Service information",
            "/classify": "POST: classify tags into one of the given categories",
            "/openapi.json": "OpenAPI document",
            "/docs": "Swagger UI",
            "/redoc": "ReDoc",
        }
    }))
}

/// Classify a tag list.
///
/// Body shape errors become 422 before the classifier runs; semantic
/// errors come back from [`TagClassifier`](crate::TagClassifier) as 400.
#[utoipa::path(
    post,
    path = "/classify",
    tag = "Classification",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Best category for the tags", body = ClassificationResult),
        (status = 400, description = "Empty tags, too few or repeated categories", body = ErrorResponse),
        (status = 413, description = "Body over the configured limit", body = ErrorResponse),
        (status = 422, description = "Body is not a valid request", body = ErrorResponse),
        (status = 500, description = "Model failed or returned malformed scores", body = ErrorResponse),
        (status = 503, description = "Model is loading or rate limited", body = ErrorResponse),
    )
)]
pub async fn classify(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> ApiResult<Json<ClassificationResult>> {
    let Json(request) = payload.map_err(reject_body)?;
    let (tags, categories) = request.as_slices();

    let result = state
        .classifier
        .classify_tags(&tags, &categories, request.options())
        .await?;
    Ok(Json(result))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

fn reject_body(rejection: JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(rejection.body_text())
    }
}
