//! One conversational turn against a hosted assistant.

use std::sync::Arc;
use std::time::Duration;

use careline_checklist::{reported_check, Checklist, ChecklistResult};
use careline_core::{MessageRole, RunOutcome, RunState, ThreadMessage, TriageError};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::openai::OpenAiAssistants;
use crate::provider::{AssistantsProvider, RECENT_MESSAGES_LIMIT};

/// How often and for how long a pending run is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Give up once the next wait would pass this much elapsed time.
    pub timeout: Option<Duration>,
    /// Give up after this many status checks.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(120)),
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self { interval, timeout, max_attempts: None }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// The status is always checked at least once, even when the interval
    /// alone exceeds the timeout.
    fn exhausted(&self, attempts: u32, elapsed: Duration) -> bool {
        let over_attempts = self.max_attempts.is_some_and(|max| attempts >= max);
        let over_time = attempts > 0
            && self.timeout.is_some_and(|limit| elapsed + self.interval > limit);
        over_attempts || over_time
    }
}

/// A reply together with its checklist evaluation.
#[derive(Debug, Clone)]
pub struct CheckedReply {
    pub thread_id: String,
    pub text: String,
    pub check: ChecklistResult,
    /// Fenced JSON block the assistant appended to its reply, if any.
    pub reported_check: Option<serde_json::Value>,
}

/// Drives a single message through a provider-side run.
///
/// Holds no per-conversation state; concurrent calls are isolated by their threads.
pub struct Orchestrator {
    provider: Option<Arc<dyn AssistantsProvider>>,
    policy: PollPolicy,
}

impl Orchestrator {
    /// Creates an orchestrator; `None` means no credential is configured.
    pub fn new(provider: Option<Arc<dyn AssistantsProvider>>, policy: PollPolicy) -> Self {
        Self { provider, policy }
    }

    /// Builds the OpenAI-backed orchestrator from an optional API key.
    pub fn from_credential(api_key: Option<&str>, api_base: Option<&str>, policy: PollPolicy) -> Self {
        let provider = api_key.map(|key| {
            Arc::new(OpenAiAssistants::new(key, api_base)) as Arc<dyn AssistantsProvider>
        });
        Self::new(provider, policy)
    }

    /// Fails with a configuration error when no provider credential is available.
    pub fn ensure_configured(&self) -> Result<(), TriageError> {
        self.provider().map(|_| ())
    }

    fn provider(&self) -> Result<&dyn AssistantsProvider, TriageError> {
        self.provider
            .as_deref()
            .ok_or_else(|| TriageError::Configuration("OPENAI_API_KEY is missing".into()))
    }

    /// Posts `message` to a new or existing thread, runs the assistant, and returns its reply.
    ///
    /// The reply is the newest assistant-authored message written by this run,
    /// reduced to its text segments joined by newlines and trimmed. Replies
    /// from earlier turns on a reused thread are never returned.
    pub async fn run_once(
        &self,
        assistant_id: &str,
        message: &str,
        thread_id: Option<&str>,
    ) -> Result<RunOutcome, TriageError> {
        let provider = self.provider()?;

        if assistant_id.trim().is_empty() {
            return Err(TriageError::validation("assistantId is required"));
        }
        if message.is_empty() {
            return Err(TriageError::validation("message is required (string)"));
        }

        let thread_id = match thread_id.map(str::trim).filter(|t| !t.is_empty()) {
            Some(existing) => {
                debug!("Reusing thread {}", existing);
                existing.to_string()
            }
            None => provider.create_thread().await?,
        };

        provider.add_user_message(&thread_id, message).await?;
        let run = provider.start_run(&thread_id, assistant_id).await?;
        info!("Run {} started (assistant: {}, thread: {})", run.id, assistant_id, thread_id);

        let run = self.wait_for_run(provider, &thread_id, run).await?;
        if !run.status.is_completed() {
            warn!("Run {} ended as {}", run.id, run.status);
            return Err(TriageError::RunNotCompleted {
                status: run.status,
                detail: run.last_error,
            });
        }

        let messages = provider.recent_messages(&thread_id, RECENT_MESSAGES_LIMIT).await?;
        let text = messages
            .iter()
            .find(|m| m.role == MessageRole::Assistant && m.produced_by(&run.id))
            .map(ThreadMessage::text)
            .unwrap_or_else(|| {
                warn!("Run {} completed without an assistant reply", run.id);
                String::new()
            });

        info!("Run {} completed ({} chars)", run.id, text.len());
        Ok(RunOutcome { thread_id, text })
    }

    /// [`run_once`](Self::run_once) followed by checklist evaluation of the reply.
    pub async fn run_and_check(
        &self,
        checklist: &Checklist,
        assistant_id: &str,
        message: &str,
        thread_id: Option<&str>,
    ) -> Result<CheckedReply, TriageError> {
        let outcome = self.run_once(assistant_id, message, thread_id).await?;
        let check = checklist.evaluate(&outcome.text);
        let reported_check = reported_check(&outcome.text);

        Ok(CheckedReply {
            thread_id: outcome.thread_id,
            text: outcome.text,
            check,
            reported_check,
        })
    }

    /// Polls until the run leaves `queued` / `in_progress` or the policy gives up.
    async fn wait_for_run(
        &self,
        provider: &dyn AssistantsProvider,
        thread_id: &str,
        mut run: RunState,
    ) -> Result<RunState, TriageError> {
        let started = Instant::now();
        let mut attempts = 0u32;

        while run.status.is_pending() {
            if self.policy.exhausted(attempts, started.elapsed()) {
                warn!("Run {} still {} after {} polls", run.id, run.status, attempts);
                return Err(TriageError::Timeout { waited: started.elapsed() });
            }

            sleep(self.policy.interval).await;
            attempts += 1;
            run = provider.get_run(thread_id, &run.id).await?;
            debug!("Run {} poll #{}: {}", run.id, attempts, run.status);
        }

        Ok(run)
    }
}
