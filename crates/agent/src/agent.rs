//! The agent: one provider, one tool registry, one conversation.
//!
//! An [`Agent`] exclusively owns its history. Every operation that can
//! touch the history takes `&mut self`, so two callers can never drive
//! the same agent at once.

use std::sync::Arc;
use tracing::debug;
use turnwise_core::agent::{AgentConfig, AgentConfigUpdate};
use turnwise_core::error::{Result, ToolError};
use turnwise_core::message::{Conversation, Message};
use turnwise_core::provider::Provider;
use turnwise_core::tool::{Tool, ToolRegistry};

use crate::context::{CondenseOutcome, condense_history};
use crate::next_speaker::{self, NextSpeakerDecision};

pub struct Agent {
    pub(crate) provider: Arc<dyn Provider>,
    pub(crate) tools: ToolRegistry,
    pub(crate) history: Conversation,
    pub(crate) config: AgentConfig,
}

impl Agent {
    /// Create an agent whose configuration is the defaults with `overrides` applied.
    pub fn new(provider: Arc<dyn Provider>, overrides: &AgentConfigUpdate) -> Self {
        Self::with_config(provider, AgentConfig::default().merged(overrides))
    }

    /// Create an agent from a complete configuration.
    pub fn with_config(provider: Arc<dyn Provider>, config: AgentConfig) -> Self {
        let mut history = Conversation::new();
        history.set_system_prompt(&config.system_prompt);
        debug!(agent = %config.name, model = %config.model, provider = provider.name(), "Agent created");
        Self {
            provider,
            tools: ToolRegistry::new(),
            history,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// A one-paragraph self description listing the registered tools.
    pub fn description(&self) -> String {
        let names = self.tools.names();
        if names.is_empty() {
            return format!("{} has no tools available.", self.config.name);
        }
        let listed = names
            .iter()
            .map(|n| format!(" {n} "))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{} and I can use the following tools:\n\n{listed}", self.config.name)
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Replace only the keys present in `update`.
    ///
    /// A new system prompt is installed (and re-stamped) immediately.
    pub fn update_config(&mut self, update: &AgentConfigUpdate) -> Result<()> {
        let next = self.config.merged(update);
        next.validate()?;
        self.config = next;
        if update.system_prompt.is_some() {
            self.history.set_system_prompt(&self.config.system_prompt);
        }
        Ok(())
    }

    /// An owned copy of the history.
    pub fn history(&self) -> Vec<Message> {
        self.history.snapshot()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.history
    }

    pub fn add_message(&mut self, message: Message) {
        self.history.push(message);
    }

    pub fn clear_history(&mut self, keep_system_prompt: bool) {
        self.history.clear(keep_system_prompt);
    }

    /// Install `prompt` as the system prompt, stamped with the current time.
    pub fn set_system_prompt(&mut self, prompt: &str) {
        self.config.system_prompt = prompt.to_string();
        self.history.set_system_prompt(prompt);
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.names()
    }

    /// Register a tool. A tool with the same name is replaced.
    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) -> std::result::Result<(), ToolError> {
        self.tools.register(tool)
    }

    pub fn register_tools(
        &mut self,
        tools: impl IntoIterator<Item = Arc<dyn Tool>>,
    ) -> std::result::Result<(), ToolError> {
        tools.into_iter().try_for_each(|tool| self.register_tool(tool))
    }

    /// Fold older history into a summary if it is over budget.
    pub async fn summarize_history(&mut self) -> CondenseOutcome {
        condense_history(
            &mut self.history,
            self.provider.as_ref(),
            &self.config.model,
            self.config.max_history_tokens,
        )
        .await
    }

    /// Run the next-speaker check without the fallback rules.
    pub async fn check_next_speaker(&self) -> Option<NextSpeakerDecision> {
        next_speaker::check_next_speaker(
            self.history.messages(),
            self.provider.as_ref(),
            self.config.arbiter_model(),
        )
        .await
    }

    /// Decide who speaks next, falling back to role-based rules.
    pub async fn pick_next_speaker(&self) -> NextSpeakerDecision {
        next_speaker::pick_next_speaker(
            self.history.messages(),
            self.provider.as_ref(),
            self.config.arbiter_model(),
        )
        .await
    }
}
