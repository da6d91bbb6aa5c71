//! Batch run handler.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::dto::{BatchRequest, BatchResponse};
use crate::error::AppError;
use crate::services;
use crate::state::ServerState;

/// Runs several named test messages against one assistant, each on its own thread.
pub async fn run_multi(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, AppError> {
    let Json(req) = payload?;

    let results = services::run::execute_batch(
        &state,
        req.assistant_id.as_deref().unwrap_or_default(),
        req.tests,
        req.fail_fast,
    )
    .await?;

    Ok(Json(BatchResponse { ok: true, results }))
}
