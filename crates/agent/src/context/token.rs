//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~4 characters per token. Exact
//! counts are not needed; the history budget is a soft limit.

use turnwise_core::message::Message;

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Estimate tokens for a single message (content only).
pub fn estimate_message_tokens(message: &Message) -> usize {
    estimate_tokens(message.text())
}

/// Estimate tokens for a slice of messages.
pub fn estimate_messages_tokens(messages: &[Message]) -> usize {
    messages.iter().map(estimate_message_tokens).sum()
}
