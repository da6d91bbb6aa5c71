//! Data transfer objects for HTTP message serialization.

use careline_assistants::{BatchItem, CheckedReply};
use careline_checklist::ChecklistResult;
use serde::{Deserialize, Serialize};

// === Run Types ===

/// Body of `POST /api/assistants/run`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Body of `POST /api/assistants/run/{short_name}`; the assistant is resolved server-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRunRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Successful single-run response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub ok: bool,
    pub thread_id: String,
    pub text: String,
    pub check: ChecklistResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_check: Option<serde_json::Value>,
}

impl From<CheckedReply> for RunResponse {
    fn from(reply: CheckedReply) -> Self {
        Self {
            ok: true,
            thread_id: reply.thread_id,
            text: reply.text,
            check: reply.check,
            reported_check: reply.reported_check,
        }
    }
}

// === Batch Types ===

/// One named test message.
#[derive(Debug, Deserialize)]
pub struct BatchTest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /api/assistants/run-multi`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub tests: Vec<BatchTest>,
    /// Abort the whole batch on the first failing test.
    #[serde(default)]
    pub fail_fast: bool,
}

/// Per-test entry of a batch response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub name: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<ChecklistResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<BatchItem> for BatchResult {
    fn from(item: BatchItem) -> Self {
        match item.outcome {
            Ok(reply) => Self {
                name: item.name,
                ok: true,
                thread_id: Some(reply.thread_id),
                text: Some(reply.text),
                check: Some(reply.check),
                error: None,
            },
            Err(e) => Self {
                name: item.name,
                ok: false,
                thread_id: None,
                text: None,
                check: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Batch response; `ok` is true even when individual tests failed.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub ok: bool,
    pub results: Vec<BatchResult>,
}

// === Health ===

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub status: &'static str,
}
