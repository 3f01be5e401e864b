//! # Turnwise Core
//!
//! Domain types, traits, and error definitions for the Turnwise
//! conversational agent. This crate knows nothing about HTTP or terminals;
//! it defines the two contracts the orchestrator consumes:
//!
//! - [`Provider`]: one request in, one completion out
//! - [`Tool`]: arguments in, textual [`ToolResult`] out
//!
//! plus the value objects that flow between them.

pub mod agent;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;
pub mod validation;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentConfig, AgentConfigUpdate};
pub use error::{Error, ProviderError, Result, ToolError};
pub use message::{Conversation, Message, MessageToolCall, Role};
pub use provider::{
    Provider, ProviderRequest, ProviderResponse, ResponseFormat, ToolDefinition, Usage,
};
pub use tool::{
    Progress, ProgressFn, Tool, ToolCall, ToolName, ToolOutcome, ToolRegistry, ToolResult,
};
