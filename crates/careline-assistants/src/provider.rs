//! Provider abstraction over a stateful threads / runs conversation API.

use async_trait::async_trait;
use careline_core::{RunState, ThreadMessage, TriageError};

/// How many of the newest thread messages are fetched when looking for the reply.
pub const RECENT_MESSAGES_LIMIT: u8 = 20;

/// Operations the orchestrator needs from a hosted assistant provider.
///
/// Implementations own no conversation state; every call addresses a
/// provider-side thread by its opaque ID.
#[async_trait]
pub trait AssistantsProvider: Send + Sync {
    /// Creates an empty thread and returns its ID.
    async fn create_thread(&self) -> Result<String, TriageError>;

    /// Appends a user-authored message to the thread.
    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), TriageError>;

    /// Starts a run of `assistant_id` over the thread.
    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunState, TriageError>;

    /// Fetches the current state of a run.
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<RunState, TriageError>;

    /// Lists up to `limit` thread messages, newest first.
    async fn recent_messages(
        &self,
        thread_id: &str,
        limit: u8,
    ) -> Result<Vec<ThreadMessage>, TriageError>;
}
