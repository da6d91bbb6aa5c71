//! HTTP route handlers for the triage relay.

pub mod batch;
pub mod run;

use axum::Json;

use crate::dto::HealthResponse;
use crate::error::AppError;

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true, service: "careline", status: "running" })
}

/// Fallback for paths with no route.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not found".into())
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
