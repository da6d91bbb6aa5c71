//! Shared server state accessible from all handlers.

use careline_assistants::{Orchestrator, PollPolicy};
use careline_checklist::{Checklist, RuleSetError};
use careline_config::{AssistantRegistry, ServerConfig};
use tracing::{info, warn};

pub struct ServerState {
    pub orchestrator: Orchestrator,
    pub checklist: Checklist,
    pub assistants: AssistantRegistry,
}

impl ServerState {
    pub fn new(orchestrator: Orchestrator, checklist: Checklist, assistants: AssistantRegistry) -> Self {
        Self { orchestrator, checklist, assistants }
    }

    /// Builds the state from startup configuration.
    ///
    /// A missing or unreadable assistants file leaves the named routes empty
    /// rather than stopping the server.
    pub fn from_config(config: &ServerConfig) -> Result<Self, RuleSetError> {
        let checklist = Checklist::for_locale(&config.checklist_locale)?;
        info!("Checklist rules: {}", checklist.locale());

        let assistants = AssistantRegistry::load_from_file(&config.assistants_file).unwrap_or_else(|e| {
            warn!("Failed to load assistants: {}", e);
            AssistantRegistry::new()
        });
        info!("Loaded {} assistants", assistants.len());
        for name in assistants.names() {
            info!("  - {}", name);
        }

        if config.api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; run requests will fail until it is configured");
        }

        let policy = PollPolicy::new(config.poll_interval, config.poll_timeout);
        let orchestrator =
            Orchestrator::from_credential(config.api_key.as_deref(), config.api_base.as_deref(), policy);

        Ok(Self::new(orchestrator, checklist, assistants))
    }
}
