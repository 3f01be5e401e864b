//! The conversational agent.
//!
//! An [`Agent`] owns a conversation and drives it through
//! [`Agent::generate_response`]:
//!
//! 1. **Receive** a user message and keep the history within budget
//! 2. **Complete** with the full history and tool schemas
//! 3. **If tool calls**: execute them, append results, complete again
//! 4. **Arbitrate** whether the assistant should keep talking
//!
//! Presets in [`presets`] wire up ready-made agents with built-in tools.

pub mod agent;
pub mod context;
pub mod loop_runner;
pub mod next_speaker;
pub mod presets;

#[cfg(test)]
mod test_helpers;

pub use agent::Agent;
pub use context::{CondenseOutcome, estimate_messages_tokens, estimate_tokens};
pub use loop_runner::{Reply, StopReason};
pub use next_speaker::{NextSpeakerDecision, Speaker};
pub use presets::{Preset, general_assistant, travel_assistant};
