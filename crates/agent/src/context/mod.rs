//! Conversation context management.
//!
//! The history itself lives in [`turnwise_core::Conversation`]; this module
//! estimates its size and folds older turns into a summary when it outgrows
//! the configured budget.

pub mod condense;
pub mod token;

pub use condense::{CondenseOutcome, KEEP_RECENT, SUMMARY_PREFIX, condense_history};
pub use token::{estimate_message_tokens, estimate_messages_tokens, estimate_tokens};
