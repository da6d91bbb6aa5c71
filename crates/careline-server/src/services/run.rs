//! Assistant runs and batch runs on behalf of HTTP handlers.

use careline_assistants::{BatchCase, BatchMode, BatchRunner, CheckedReply};
use tracing::info;

use crate::dto::{BatchResult, BatchTest};
use crate::error::AppError;
use crate::state::ServerState;

/// Runs one message through `assistant_id` and scores the reply.
pub async fn execute_run(
    state: &ServerState,
    assistant_id: &str,
    message: &str,
    thread_id: Option<&str>,
) -> Result<CheckedReply, AppError> {
    let reply = state
        .orchestrator
        .run_and_check(&state.checklist, assistant_id, message, thread_id)
        .await?;

    info!(
        "Thread {}: {}/5 checks (approved: {})",
        reply.thread_id,
        reply.check.score(),
        reply.check.approved()
    );
    Ok(reply)
}

/// Runs every test sequentially and maps each outcome to a response entry.
pub async fn execute_batch(
    state: &ServerState,
    assistant_id: &str,
    tests: Vec<BatchTest>,
    fail_fast: bool,
) -> Result<Vec<BatchResult>, AppError> {
    let cases: Vec<BatchCase> = tests
        .into_iter()
        .map(|t| BatchCase::new(t.name, t.message))
        .collect();
    let mode = if fail_fast { BatchMode::FailFast } else { BatchMode::ContinueOnError };

    let items = BatchRunner::new(&state.orchestrator, &state.checklist)
        .run(assistant_id, &cases, mode)
        .await?;

    let failed = items.iter().filter(|i| i.outcome.is_err()).count();
    info!("Batch finished: {} cases, {} failed", items.len(), failed);

    Ok(items.into_iter().map(BatchResult::from).collect())
}
