//! History condensation.
//!
//! When the estimated history size exceeds the budget, everything between
//! the system prompt and the last [`KEEP_RECENT`] messages is summarized by
//! one extra completion call and replaced with a single assistant message.
//! Condensation is best-effort: a failed summary call leaves history as is.

use tracing::{debug, info, warn};
use turnwise_core::message::{Conversation, Message};
use turnwise_core::provider::{Provider, ProviderRequest};

use super::token::estimate_messages_tokens;

/// Messages kept verbatim at the tail of the history.
///
/// The window is purely positional. It may begin with a tool result whose
/// requesting assistant message was folded into the summary.
pub const KEEP_RECENT: usize = 5;

/// Prefix of the synthetic summary message.
pub const SUMMARY_PREFIX: &str = "[CONVERSATION SUMMARY]: ";

const SUMMARY_TEMPERATURE: f32 = 0.3;
const SUMMARY_MAX_TOKENS: u32 = 500;
const SUMMARY_FALLBACK: &str = "Summary unavailable";

/// What a condensation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CondenseOutcome {
    /// Estimated size is within budget; nothing to do
    WithinBudget { estimated: usize },
    /// Over budget, but every message is either system or recent
    NothingToFold { estimated: usize },
    /// `folded` messages were replaced by one summary
    Condensed {
        folded: usize,
        before: usize,
        after: usize,
    },
    /// The summary call failed; history is unchanged
    Failed { reason: String },
}

/// Build the summarization prompt for `span`.
pub fn summary_prompt(span: &[Message]) -> String {
    let transcript = span
        .iter()
        .map(|m| format!("{}: {}", m.role, m.text()))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Please summarize the following conversation history, preserving key information, decisions, and context:\n\n{transcript}"
    )
}

/// Condense `conversation` if its estimated size exceeds `budget` tokens.
pub async fn condense_history(
    conversation: &mut Conversation,
    provider: &dyn Provider,
    model: &str,
    budget: usize,
) -> CondenseOutcome {
    let estimated = estimate_messages_tokens(conversation.messages());
    if estimated <= budget {
        return CondenseOutcome::WithinBudget { estimated };
    }

    let span = conversation.condensable_span(KEEP_RECENT);
    if span.is_empty() {
        debug!(estimated, budget, "History over budget but nothing to fold");
        return CondenseOutcome::NothingToFold { estimated };
    }

    let request = ProviderRequest::new(model, vec![Message::user(summary_prompt(span))], SUMMARY_TEMPERATURE)
        .with_max_tokens(SUMMARY_MAX_TOKENS);

    let response = match provider.complete(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Failed to summarize history; keeping it as is");
            return CondenseOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    let summary = match response.message.text() {
        "" => SUMMARY_FALLBACK,
        text => text,
    };
    let before = conversation.len();
    let folded = conversation.fold_into_summary(
        Message::assistant(format!("{SUMMARY_PREFIX}{summary}")),
        KEEP_RECENT,
    );
    let after = conversation.len();

    info!(
        folded,
        before,
        after,
        estimated,
        budget,
        "Condensed conversation history"
    );
    CondenseOutcome::Condensed {
        folded,
        before,
        after,
    }
}
