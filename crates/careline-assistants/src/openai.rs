//! OpenAI Assistants (threads / messages / runs) provider.

use async_openai::{
    config::OpenAIConfig,
    types::{
        CreateMessageRequestArgs, CreateMessageRequestContent, CreateRunRequestArgs,
        CreateThreadRequest, MessageContent, MessageObject, MessageRole as OpenAiRole, RunObject,
        RunStatus as OpenAiRunStatus,
    },
    Client,
};
use async_trait::async_trait;
use careline_core::{ContentSegment, MessageRole, RunState, RunStatus, ThreadMessage, TriageError};
use tracing::debug;

use crate::provider::AssistantsProvider;

/// Provider backed by the OpenAI Assistants API.
///
/// One client is built at startup and shared by every request.
pub struct OpenAiAssistants {
    client: Client<OpenAIConfig>,
}

impl OpenAiAssistants {
    /// Creates a client with the given credential and optional API base URL.
    pub fn new(api_key: &str, api_base: Option<&str>) -> Self {
        let config = match api_base {
            Some(base) => OpenAIConfig::new().with_api_key(api_key).with_api_base(base),
            None => OpenAIConfig::new().with_api_key(api_key),
        };

        Self {
            client: Client::with_config(config),
        }
    }
}

fn map_status(status: OpenAiRunStatus) -> RunStatus {
    match status {
        OpenAiRunStatus::Queued => RunStatus::Queued,
        OpenAiRunStatus::InProgress => RunStatus::InProgress,
        OpenAiRunStatus::RequiresAction => RunStatus::RequiresAction,
        OpenAiRunStatus::Cancelling => RunStatus::Cancelling,
        OpenAiRunStatus::Cancelled => RunStatus::Cancelled,
        OpenAiRunStatus::Failed => RunStatus::Failed,
        OpenAiRunStatus::Completed => RunStatus::Completed,
        OpenAiRunStatus::Incomplete => RunStatus::Incomplete,
        OpenAiRunStatus::Expired => RunStatus::Expired,
    }
}

fn run_state(run: RunObject) -> RunState {
    RunState {
        id: run.id,
        status: map_status(run.status),
        last_error: run.last_error.map(|e| e.message),
    }
}

fn thread_message(message: MessageObject) -> ThreadMessage {
    let role = match message.role {
        OpenAiRole::User => MessageRole::User,
        OpenAiRole::Assistant => MessageRole::Assistant,
    };

    let segments = message
        .content
        .into_iter()
        .map(|block| match block {
            MessageContent::Text(t) => ContentSegment::Text(t.text.value),
            MessageContent::ImageFile(_) => ContentSegment::Other("image_file".into()),
            MessageContent::ImageUrl(_) => ContentSegment::Other("image_url".into()),
            _ => ContentSegment::Other("unsupported".into()),
        })
        .collect();

    ThreadMessage { role, segments, run_id: message.run_id }
}

#[async_trait]
impl AssistantsProvider for OpenAiAssistants {
    async fn create_thread(&self) -> Result<String, TriageError> {
        let thread = self
            .client
            .threads()
            .create(CreateThreadRequest::default())
            .await
            .map_err(TriageError::provider)?;
        debug!("Created thread {}", thread.id);
        Ok(thread.id)
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), TriageError> {
        let request = CreateMessageRequestArgs::default()
            .role(OpenAiRole::User)
            .content(CreateMessageRequestContent::Content(content.to_string()))
            .build()
            .map_err(TriageError::provider)?;

        self.client
            .threads()
            .messages(thread_id)
            .create(request)
            .await
            .map_err(TriageError::provider)?;
        Ok(())
    }

    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunState, TriageError> {
        let request = CreateRunRequestArgs::default()
            .assistant_id(assistant_id)
            .build()
            .map_err(TriageError::provider)?;

        let run = self
            .client
            .threads()
            .runs(thread_id)
            .create(request)
            .await
            .map_err(TriageError::provider)?;
        Ok(run_state(run))
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<RunState, TriageError> {
        let run = self
            .client
            .threads()
            .runs(thread_id)
            .retrieve(run_id)
            .await
            .map_err(TriageError::provider)?;
        Ok(run_state(run))
    }

    async fn recent_messages(
        &self,
        thread_id: &str,
        limit: u8,
    ) -> Result<Vec<ThreadMessage>, TriageError> {
        let limit = limit.to_string();
        let query = [("order", "desc"), ("limit", limit.as_str())];

        let page = self
            .client
            .threads()
            .messages(thread_id)
            .list(&query)
            .await
            .map_err(TriageError::provider)?;

        Ok(page.data.into_iter().map(thread_message).collect())
    }
}
