//! In-memory provider for exercising the orchestrator without network access.
//!
//! [`ScriptedProvider`] replays a fixed sequence of run statuses for every run
//! it starts and appends a canned assistant reply once a run completes.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use careline_core::{RunState, RunStatus, ThreadMessage, TriageError};

use crate::provider::AssistantsProvider;

#[derive(Default)]
struct Script {
    statuses: Vec<RunStatus>,
    last_error: Option<String>,
    reply: Vec<String>,
    fail_on: Option<String>,
    threads: HashMap<String, Vec<ThreadMessage>>,
    runs: HashMap<String, RunScript>,
    created_threads: Vec<String>,
    started_runs: Vec<(String, String)>,
    polls: usize,
}

struct RunScript {
    thread_id: String,
    remaining: VecDeque<RunStatus>,
    replied: bool,
}

impl Script {
    fn complete(&mut self, thread_id: &str, run_id: &str) {
        if self.reply.is_empty() {
            return;
        }
        let reply = ThreadMessage::assistant(self.reply.iter().cloned()).with_run(run_id);
        self.threads.entry(thread_id.to_string()).or_default().push(reply);
    }
}

/// Scripted [`AssistantsProvider`].
///
/// `start_run` reports the first scripted status; each `get_run` advances to
/// the next one and repeats the last once the script runs out.
pub struct ScriptedProvider {
    script: Mutex<Script>,
}

impl ScriptedProvider {
    /// Runs go queued → in_progress → completed and reply with `segments`;
    /// no segments means the run completes without writing a reply.
    pub fn completing_with<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(Script {
                statuses: vec![RunStatus::Queued, RunStatus::InProgress, RunStatus::Completed],
                reply: segments.into_iter().map(Into::into).collect(),
                ..Script::default()
            }),
        }
    }

    /// Replaces the status sequence replayed by every run.
    pub fn with_statuses(self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        self.lock().statuses = statuses.into_iter().collect();
        self
    }

    /// Sets the provider error message attached to runs.
    pub fn with_last_error(self, message: impl Into<String>) -> Self {
        self.lock().last_error = Some(message.into());
        self
    }

    /// Seeds an existing thread with earlier messages, oldest first.
    pub fn with_history(self, thread_id: impl Into<String>, messages: Vec<ThreadMessage>) -> Self {
        self.lock().threads.insert(thread_id.into(), messages);
        self
    }

    /// Makes `add_user_message` fail for messages containing `needle`.
    pub fn failing_messages_containing(self, needle: impl Into<String>) -> Self {
        self.lock().fail_on = Some(needle.into());
        self
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// IDs of threads created so far, in creation order.
    pub fn created_threads(&self) -> Vec<String> {
        self.lock().created_threads.clone()
    }

    /// `(thread_id, assistant_id)` for every run started.
    pub fn started_runs(&self) -> Vec<(String, String)> {
        self.lock().started_runs.clone()
    }

    /// Number of `get_run` calls.
    pub fn polls(&self) -> usize {
        self.lock().polls
    }

    /// Messages stored on a thread, oldest first.
    pub fn thread_messages(&self, thread_id: &str) -> Vec<ThreadMessage> {
        self.lock().threads.get(thread_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl AssistantsProvider for ScriptedProvider {
    async fn create_thread(&self) -> Result<String, TriageError> {
        let mut script = self.lock();
        let id = format!("thread_{}", script.created_threads.len() + 1);
        script.threads.insert(id.clone(), Vec::new());
        script.created_threads.push(id.clone());
        Ok(id)
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), TriageError> {
        let mut script = self.lock();
        if script.fail_on.as_deref().is_some_and(|needle| content.contains(needle)) {
            return Err(TriageError::provider("400 Bad Request: message rejected"));
        }
        script
            .threads
            .entry(thread_id.to_string())
            .or_default()
            .push(ThreadMessage::user(content));
        Ok(())
    }

    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunState, TriageError> {
        let mut script = self.lock();
        let id = format!("run_{}", script.started_runs.len() + 1);
        script.started_runs.push((thread_id.to_string(), assistant_id.to_string()));

        let mut statuses: VecDeque<RunStatus> = script.statuses.iter().copied().collect();
        let status = statuses.pop_front().unwrap_or(RunStatus::Completed);
        if statuses.is_empty() {
            statuses.push_back(status);
        }
        if status.is_completed() {
            script.complete(thread_id, &id);
        }
        let last_error = script.last_error.clone();
        script.runs.insert(
            id.clone(),
            RunScript {
                thread_id: thread_id.to_string(),
                remaining: statuses,
                replied: status.is_completed(),
            },
        );

        Ok(RunState { id, status, last_error })
    }

    async fn get_run(&self, _thread_id: &str, run_id: &str) -> Result<RunState, TriageError> {
        let mut script = self.lock();
        script.polls += 1;

        let run = script
            .runs
            .get_mut(run_id)
            .ok_or_else(|| TriageError::provider(format!("404 Not Found: run {run_id}")))?;
        let status = if run.remaining.len() > 1 {
            run.remaining.pop_front().unwrap_or(RunStatus::Completed)
        } else {
            run.remaining.front().copied().unwrap_or(RunStatus::Completed)
        };
        let needs_reply = status.is_completed() && !run.replied;
        run.replied |= needs_reply;
        let thread_id = run.thread_id.clone();

        if needs_reply {
            script.complete(&thread_id, run_id);
        }

        Ok(RunState {
            id: run_id.to_string(),
            status,
            last_error: script.last_error.clone(),
        })
    }

    async fn recent_messages(
        &self,
        thread_id: &str,
        limit: u8,
    ) -> Result<Vec<ThreadMessage>, TriageError> {
        let script = self.lock();
        let messages = script
            .threads
            .get(thread_id)
            .map(|m| m.iter().rev().take(limit as usize).cloned().collect())
            .unwrap_or_default();
        Ok(messages)
    }
}
