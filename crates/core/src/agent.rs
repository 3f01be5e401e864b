//! Agent configuration: an immutable-after-merge record plus the partial
//! update type used both at construction and by later `update_config` calls.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Configuration for one agent instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Display name, also used in the tool description
    #[serde(default = "default_name")]
    pub name: String,

    /// Target model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max output tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// System prompt text (without the time line)
    #[serde(default)]
    pub system_prompt: String,

    /// Soft budget for the estimated history size before condensation kicks in
    #[serde(default = "default_max_history_tokens")]
    pub max_history_tokens: usize,

    /// How many times the assistant may continue on its own before the
    /// loop forcibly yields to the user
    #[serde(default = "default_max_continuations")]
    pub max_continuations: u32,

    /// Model used for the next-speaker check; falls back to `model`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arbiter_model: Option<String>,
}

fn default_name() -> String {
    "Assistant".into()
}
fn default_model() -> String {
    "gpt-4".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    8192
}
fn default_max_history_tokens() -> usize {
    64_000
}
fn default_max_continuations() -> u32 {
    8
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: String::new(),
            max_history_tokens: default_max_history_tokens(),
            max_continuations: default_max_continuations(),
            arbiter_model: None,
        }
    }
}

impl AgentConfig {
    /// Return a copy with every key present in `update` replaced.
    pub fn merged(&self, update: &AgentConfigUpdate) -> Self {
        let mut next = self.clone();
        next.apply(update);
        next
    }

    /// Replace only the keys present in `update`.
    pub fn apply(&mut self, update: &AgentConfigUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(model) = &update.model {
            self.model = model.clone();
        }
        if let Some(temperature) = update.temperature {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = update.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(prompt) = &update.system_prompt {
            self.system_prompt = prompt.clone();
        }
        if let Some(budget) = update.max_history_tokens {
            self.max_history_tokens = budget;
        }
        if let Some(limit) = update.max_continuations {
            self.max_continuations = limit;
        }
        if let Some(model) = &update.arbiter_model {
            self.arbiter_model = Some(model.clone());
        }
    }

    /// The model the next-speaker check should use.
    pub fn arbiter_model(&self) -> &str {
        self.arbiter_model.as_deref().unwrap_or(&self.model)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Config {
                message: format!("temperature must be between 0.0 and 2.0, got {}", self.temperature),
            });
        }
        if self.max_tokens == 0 {
            return Err(Error::Config {
                message: "max_tokens must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

/// A partial [`AgentConfig`]: `None` keys leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_history_tokens: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_continuations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arbiter_model: Option<String>,
}

impl AgentConfigUpdate {
    /// Layer `other` on top of `self`; keys set in `other` win.
    pub fn and(mut self, other: &AgentConfigUpdate) -> Self {
        macro_rules! take {
            ($($field:ident),*) => {
                $( if other.$field.is_some() { self.$field = other.$field.clone(); } )*
            };
        }
        take!(
            name,
            model,
            temperature,
            max_tokens,
            system_prompt,
            max_history_tokens,
            max_continuations,
            arbiter_model
        );
        self
    }
}
