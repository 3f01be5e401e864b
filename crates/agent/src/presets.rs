//! Ready-made agents.
//!
//! Each preset fixes a name, model, system prompt and tool set. Caller
//! overrides (usually the `[agent]` table of the config file) are applied
//! on top of the preset's values.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use turnwise_core::agent::{AgentConfig, AgentConfigUpdate};
use turnwise_core::error::{Error, Result};
use turnwise_core::provider::Provider;
use turnwise_core::tool::Tool;
use turnwise_tools::{CalculatorTool, EventSearchTool, WeatherLookupTool, WebSearchTool};

use crate::agent::Agent;

const PRESET_MODEL: &str = "gpt-4.1";

const GENERAL_PROMPT: &str = "You are a helpful and friendly General Assistant. Your goal is to assist users with their questions and tasks to the best of your ability.

You should be:
- **Conversational and Engaging**: Interact with users in a natural and friendly manner.
- **Helpful and Informative**: Provide clear, concise, and accurate information.
- **Versatile**: Be ready to handle a wide variety of requests.

When responding to users, always aim to be clear and supportive. If you cannot fulfill a request, explain why in a helpful way.";

const TRAVEL_PROMPT: &str = "You are a Travel Assistant specialized in helping with travel-related tasks. You can:

1. **Fetch Weather Information**: Get current weather conditions and forecasts for any location
2. **Fetch Events**: Find things to do at a destination, optionally filtered by date and category

You should be friendly, helpful, and make travel planning enjoyable and efficient. Always provide clear information about weather conditions and the events you found.

When helping users:
- Be enthusiastic about travel opportunities
- Provide detailed weather information
- Offer helpful travel tips and suggestions
- Make recommendations based on user preferences";

/// The built-in agent presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    General,
    Travel,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Travel => "travel",
        }
    }

    /// Build the preset's agent with `overrides` applied.
    pub fn build(self, provider: Arc<dyn Provider>, overrides: &AgentConfigUpdate) -> Result<Agent> {
        match self {
            Self::General => general_assistant(provider, overrides),
            Self::Travel => travel_assistant(provider, overrides),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "travel" => Ok(Self::Travel),
            other => Err(Error::Config {
                message: format!("unknown preset '{other}' (expected 'general' or 'travel')"),
            }),
        }
    }
}

/// A general-purpose assistant with calculator and web search.
pub fn general_assistant(provider: Arc<dyn Provider>, overrides: &AgentConfigUpdate) -> Result<Agent> {
    let base = AgentConfig {
        name: "General Assistant".into(),
        model: PRESET_MODEL.into(),
        temperature: 0.7,
        max_tokens: 2000,
        system_prompt: GENERAL_PROMPT.into(),
        ..AgentConfig::default()
    };
    let tools: [Arc<dyn Tool>; 2] = [Arc::new(CalculatorTool), Arc::new(WebSearchTool)];
    assemble(provider, base, overrides, tools)
}

/// A travel assistant with weather and event lookup, on a tight history budget.
pub fn travel_assistant(provider: Arc<dyn Provider>, overrides: &AgentConfigUpdate) -> Result<Agent> {
    let base = AgentConfig {
        name: "Travel Assistant".into(),
        model: PRESET_MODEL.into(),
        temperature: 0.7,
        max_tokens: 2000,
        system_prompt: TRAVEL_PROMPT.into(),
        max_history_tokens: 6000,
        ..AgentConfig::default()
    };
    let tools: [Arc<dyn Tool>; 2] = [Arc::new(WeatherLookupTool::new()), Arc::new(EventSearchTool)];
    assemble(provider, base, overrides, tools)
}

fn assemble(
    provider: Arc<dyn Provider>,
    base: AgentConfig,
    overrides: &AgentConfigUpdate,
    tools: impl IntoIterator<Item = Arc<dyn Tool>>,
) -> Result<Agent> {
    let config = base.merged(overrides);
    config.validate()?;
    let mut agent = Agent::with_config(provider, config);
    agent.register_tools(tools)?;
    Ok(agent)
}
