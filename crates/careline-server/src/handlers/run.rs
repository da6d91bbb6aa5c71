//! Single-message run handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::info;

use crate::dto::{NamedRunRequest, RunRequest, RunResponse};
use crate::error::AppError;
use crate::services;
use crate::state::ServerState;

/// Runs a message against an explicit assistant ID.
pub async fn run(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, AppError> {
    let Json(req) = payload?;

    let reply = services::run::execute_run(
        &state,
        req.assistant_id.as_deref().unwrap_or_default(),
        req.message.as_deref().unwrap_or_default(),
        req.thread_id.as_deref(),
    )
    .await?;

    Ok(Json(reply.into()))
}

/// Runs a message against the assistant registered under `short_name`.
///
/// Unknown names are rejected before the body is looked at.
pub async fn run_named(
    State(state): State<Arc<ServerState>>,
    Path(short_name): Path<String>,
    payload: Result<Json<NamedRunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, AppError> {
    let assistant_id = state
        .assistants
        .resolve(&short_name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown assistant: {}", short_name)))?;
    info!("Assistant '{}' requested", short_name);

    let Json(req) = payload?;

    let reply = services::run::execute_run(
        &state,
        assistant_id,
        req.message.as_deref().unwrap_or_default(),
        req.thread_id.as_deref(),
    )
    .await?;

    Ok(Json(reply.into()))
}
