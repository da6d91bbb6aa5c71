//! Assistant run orchestration for careline.
//!
//! This crate drives a hosted assistant through one conversational turn:
//!
//! - [`AssistantsProvider`] — Trait over the provider's threads / messages / runs API
//! - [`OpenAiAssistants`] — Provider implementation backed by `async-openai`
//! - [`Orchestrator`] — Create-or-reuse thread, post message, run, poll, extract reply
//! - [`BatchRunner`] — Sequential runs over named test messages
//! - [`PollPolicy`] — Polling interval and ceiling
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use careline_assistants::{Orchestrator, PollPolicy};
//!
//! let orchestrator = Orchestrator::from_credential(Some(&api_key), None, PollPolicy::default());
//! let outcome = orchestrator.run_once("asst_123", "Estou com dor no peito", None).await?;
//! println!("{}: {}", outcome.thread_id, outcome.text);
//! ```

mod batch;
mod openai;
mod orchestrator;
mod provider;
pub mod testing;

pub use batch::{BatchCase, BatchItem, BatchMode, BatchRunner};
pub use openai::OpenAiAssistants;
pub use orchestrator::{CheckedReply, Orchestrator, PollPolicy};
pub use provider::{AssistantsProvider, RECENT_MESSAGES_LIMIT};
