//! Core domain types and error definitions for careline.
//!
//! This crate provides the types shared across the careline relay:
//!
//! - [`TriageError`] — Error taxonomy for orchestration and validation
//! - [`RunStatus`] and [`RunState`] — Provider-side run lifecycle
//! - [`ThreadMessage`], [`MessageRole`], [`ContentSegment`] — Conversation entries
//! - [`RunOutcome`] — Thread handle plus extracted reply text
//!
//! # Example
//!
//! ```rust
//! use careline_core::{ContentSegment, MessageRole, ThreadMessage};
//!
//! let reply = ThreadMessage {
//!     role: MessageRole::Assistant,
//!     segments: vec![
//!         ContentSegment::Text("  Estou aqui. ".to_string()),
//!         ContentSegment::Text("1. Respire fundo".to_string()),
//!     ],
//!     run_id: Some("run_1".to_string()),
//! };
//!
//! assert!(reply.produced_by("run_1"));
//!
//! assert_eq!(reply.text(), "Estou aqui. \n1. Respire fundo");
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while running an assistant or validating input.
#[derive(Error, Debug)]
pub enum TriageError {
    /// Caller input was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The relay is missing required configuration (e.g. the provider credential).
    #[error("{0}")]
    Configuration(String),

    /// A provider API call failed.
    #[error("Provider request failed: {0}")]
    Provider(String),

    /// The run reached a terminal state other than `completed`.
    #[error("Run did not complete: {status}{}", detail_suffix(.detail))]
    RunNotCompleted {
        status: RunStatus,
        detail: Option<String>,
    },

    /// Polling gave up before the run reached a terminal state.
    #[error("Run still pending after {}s", .waited.as_secs())]
    Timeout { waited: Duration },
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
}

impl TriageError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Converts any provider-side error into `TriageError::Provider`.
    pub fn provider(e: impl ToString) -> Self {
        Self::Provider(e.to_string())
    }
}

/// Status of a provider-side run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
}

impl RunStatus {
    /// Returns `true` while the provider is still working on the run.
    pub fn is_pending(&self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Expired => "expired",
        };
        write!(f, "{}", s)
    }
}

/// Snapshot of a run as last reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub id: String,
    pub status: RunStatus,
    /// Provider-reported failure message, if any.
    pub last_error: Option<String>,
}

/// Author of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One content block of a conversation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSegment {
    Text(String),
    /// Non-text content (images, refusals); carries the provider's kind label.
    Other(String),
}

/// A single entry of a provider-side conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub role: MessageRole,
    pub segments: Vec<ContentSegment>,
    /// Run that authored the message; `None` for messages posted directly.
    pub run_id: Option<String>,
}

impl ThreadMessage {
    /// Creates an assistant entry made of text segments.
    pub fn assistant<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: MessageRole::Assistant,
            segments: segments.into_iter().map(|s| ContentSegment::Text(s.into())).collect(),
            run_id: None,
        }
    }

    /// Creates a single-segment user entry.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            segments: vec![ContentSegment::Text(content.into())],
            run_id: None,
        }
    }

    /// Attributes the message to a run.
    pub fn with_run(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn produced_by(&self, run_id: &str) -> bool {
        self.run_id.as_deref() == Some(run_id)
    }

    /// Joins all non-empty text segments with newlines, in order, and trims the result.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                ContentSegment::Text(t) if !t.is_empty() => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

/// Result of a single orchestrated run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub thread_id: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_skips_non_text_and_empty_segments() {
        let msg = ThreadMessage {
            role: MessageRole::Assistant,
            segments: vec![
                ContentSegment::Other("image_file".into()),
                ContentSegment::Text(String::new()),
                ContentSegment::Text("\n  first".into()),
                ContentSegment::Text("second  ".into()),
            ],
            run_id: None,
        };
        assert_eq!(msg.text(), "first\nsecond");
    }

    #[test]
    fn text_of_empty_message_is_empty() {
        let msg = ThreadMessage { role: MessageRole::Assistant, segments: vec![], run_id: None };
        assert_eq!(msg.text(), "");
    }

    #[test]
    fn run_attribution() {
        let reply = ThreadMessage::assistant(["ok"]).with_run("run_2");
        assert!(reply.produced_by("run_2"));
        assert!(!reply.produced_by("run_1"));
        assert!(!ThreadMessage::user("oi").produced_by("run_2"));
    }

    #[test]
    fn only_queued_and_in_progress_are_pending() {
        let pending: Vec<_> = [
            RunStatus::Queued,
            RunStatus::InProgress,
            RunStatus::RequiresAction,
            RunStatus::Cancelling,
            RunStatus::Cancelled,
            RunStatus::Failed,
            RunStatus::Completed,
            RunStatus::Incomplete,
            RunStatus::Expired,
        ]
        .into_iter()
        .filter(RunStatus::is_pending)
        .collect();
        assert_eq!(pending, vec![RunStatus::Queued, RunStatus::InProgress]);
    }

    #[test]
    fn run_not_completed_message_includes_status_and_detail() {
        let err = TriageError::RunNotCompleted {
            status: RunStatus::Failed,
            detail: Some("rate_limit_exceeded".into()),
        };
        assert_eq!(err.to_string(), "Run did not complete: failed (rate_limit_exceeded)");

        let err = TriageError::RunNotCompleted { status: RunStatus::Expired, detail: None };
        assert_eq!(err.to_string(), "Run did not complete: expired");
    }
}
