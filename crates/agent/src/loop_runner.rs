//! The turn-taking loop.
//!
//! One call to [`Agent::generate_response`] turns an optional user message
//! into one or more assistant turns:
//!
//! 1. **Append** the user message (if any) and condense the history
//! 2. **Complete** with the full history and the tool schemas
//! 3. **If tool calls**: execute them in order, append the results, and
//!    complete once more
//! 4. **Arbitrate**: if the assistant should keep talking, the verdict's
//!    reasoning becomes the next user message and the loop repeats
//!
//! Self-continuation is capped by `max_continuations`; hitting the cap
//! yields to the user with [`StopReason::ContinuationLimit`].

use tracing::{debug, info, warn};
use turnwise_core::error::Result;
use turnwise_core::message::{Message, MessageToolCall};
use turnwise_core::provider::ProviderRequest;
use turnwise_core::tool::Progress;

use crate::agent::Agent;
use crate::next_speaker::Speaker;

/// Why [`Agent::generate_response`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The arbitrator handed the floor to the user
    UserTurn,
    /// The assistant kept continuing until the cap forced a yield
    ContinuationLimit,
}

/// The outcome of one exchange.
#[derive(Debug, Clone)]
pub struct Reply {
    /// The last assistant message appended to history
    pub message: Message,
    /// How many times the assistant continued on its own
    pub continuations: u32,
    pub stop: StopReason,
}

impl Reply {
    pub fn text(&self) -> &str {
        self.message.text()
    }
}

impl Agent {
    /// Generate the assistant's reply to `user_message`.
    ///
    /// Backend failures are returned as `Error::Generation`; history keeps
    /// whatever was appended before the failure. Tool problems, arbitration
    /// failures and condensation failures are handled internally.
    pub async fn generate_response(
        &mut self,
        user_message: Option<&str>,
        progress: Progress<'_>,
    ) -> Result<Reply> {
        let mut input = user_message.map(str::to_string);
        let mut continuations = 0;

        loop {
            if let Some(text) = input.take().filter(|t| !t.is_empty()) {
                self.history.push(Message::user(text));
            }

            self.summarize_history().await;

            let mut message = self.complete_turn().await?;
            if message.has_tool_calls() {
                self.run_tool_calls(&message.tool_calls, progress).await;
                message = self.complete_turn().await?;
                // Every call must be answered before the next request.
                if message.has_tool_calls() {
                    self.run_tool_calls(&message.tool_calls, progress).await;
                }
            }

            let decision = self.pick_next_speaker().await;
            debug!(next = %decision.next_speaker, reasoning = %decision.reasoning, "Next speaker");

            if decision.next_speaker == Speaker::User {
                return Ok(Reply {
                    message,
                    continuations,
                    stop: StopReason::UserTurn,
                });
            }

            if continuations >= self.config.max_continuations {
                warn!(
                    agent = %self.config.name,
                    continuations,
                    "Continuation limit reached, yielding to the user"
                );
                return Ok(Reply {
                    message,
                    continuations,
                    stop: StopReason::ContinuationLimit,
                });
            }

            continuations += 1;
            info!(continuation = continuations, "Assistant continues without user input");
            input = Some(decision.reasoning);
        }
    }

    /// One completion over the full history; the reply is appended.
    async fn complete_turn(&mut self) -> Result<Message> {
        let request = ProviderRequest::new(
            &self.config.model,
            self.history.snapshot(),
            self.config.temperature,
        )
        .with_max_tokens(self.config.max_tokens)
        .with_tools(self.tools.definitions());

        let response = self.provider.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                tokens = usage.total_tokens,
                tool_calls = response.message.tool_calls.len(),
                "Completion received"
            );
        }

        self.history.push(response.message.clone());
        Ok(response.message)
    }

    /// Execute tool calls strictly in order, appending one result per call.
    async fn run_tool_calls(&mut self, calls: &[MessageToolCall], progress: Progress<'_>) {
        debug!(tool_count = calls.len(), "Executing tool calls");
        for call in calls {
            let outcome = self.tools.dispatch(call, progress).await;
            debug!(tool = %call.name, success = outcome.is_success(), "Tool call finished");
            self.history.push(outcome.into_message(&call.id));
        }
    }
}
