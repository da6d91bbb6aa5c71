//! Sequential batch runs of named test messages against one assistant.

use careline_checklist::Checklist;
use careline_core::TriageError;
use tracing::{info, warn};

use crate::orchestrator::{CheckedReply, Orchestrator};

/// One named message in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCase {
    pub name: String,
    pub message: String,
}

impl BatchCase {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), message: message.into() }
    }
}

/// What to do when one case fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Record the failure on the item and keep going.
    #[default]
    ContinueOnError,
    /// Abort the whole batch with the first error.
    FailFast,
}

/// Result for one case, in input order.
#[derive(Debug)]
pub struct BatchItem {
    pub name: String,
    pub outcome: Result<CheckedReply, TriageError>,
}

/// Runs cases one after another, each on a fresh thread.
pub struct BatchRunner<'a> {
    orchestrator: &'a Orchestrator,
    checklist: &'a Checklist,
}

impl<'a> BatchRunner<'a> {
    pub fn new(orchestrator: &'a Orchestrator, checklist: &'a Checklist) -> Self {
        Self { orchestrator, checklist }
    }

    pub async fn run(
        &self,
        assistant_id: &str,
        cases: &[BatchCase],
        mode: BatchMode,
    ) -> Result<Vec<BatchItem>, TriageError> {
        self.orchestrator.ensure_configured()?;

        if assistant_id.trim().is_empty() || cases.is_empty() {
            return Err(TriageError::validation("assistantId and tests[] required"));
        }

        info!("Batch of {} cases against {} ({:?})", cases.len(), assistant_id, mode);

        let mut items = Vec::with_capacity(cases.len());
        for case in cases {
            let outcome = self
                .orchestrator
                .run_and_check(self.checklist, assistant_id, &case.message, None)
                .await;

            let outcome = match outcome {
                Err(e) if mode == BatchMode::FailFast => {
                    warn!("Batch aborted at '{}': {}", case.name, e);
                    return Err(e);
                }
                other => other,
            };

            match &outcome {
                Err(e) => warn!("Batch case '{}' failed: {}", case.name, e),
                Ok(reply) => info!(
                    "Batch case '{}': {}/5 checks (approved: {})",
                    case.name,
                    reply.check.score(),
                    reply.check.approved()
                ),
            }

            items.push(BatchItem { name: case.name.clone(), outcome });
        }

        Ok(items)
    }
}
