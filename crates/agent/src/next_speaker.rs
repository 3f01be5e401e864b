//! Next-speaker arbitration.
//!
//! After an assistant turn, decide whether the assistant should keep going
//! or hand the floor back to the user. Structural rules are tried first;
//! only a plain assistant turn with content is judged by the model itself,
//! through a schema-constrained completion. Every failure of that judgment
//! is "no decision", resolved by [`fallback`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use turnwise_core::message::{Message, Role};
use turnwise_core::provider::{Provider, ProviderRequest, ResponseFormat};

/// Who should take the next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::User => f.write_str("user"),
            Speaker::Assistant => f.write_str("assistant"),
        }
    }
}

/// A verdict plus the reasoning behind it. Never stored in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextSpeakerDecision {
    #[serde(default)]
    pub reasoning: String,
    pub next_speaker: Speaker,
}

impl NextSpeakerDecision {
    fn new(next_speaker: Speaker, reasoning: &str) -> Self {
        Self {
            reasoning: reasoning.to_string(),
            next_speaker,
        }
    }
}

/// Instruction appended as a user turn when the model judges its own reply.
pub const CHECK_PROMPT: &str = r#"Analyze *only* the content and structure of your immediately preceding response (your last turn in the conversation history). Based *strictly* on that response, determine who should logically speak next: the 'user' or the 'assistant' (you).
**Decision Rules (apply in order):**
1.  **Assistant Continues:** If your last response explicitly states an immediate next action *you* intend to take (e.g., "Next, I will...", "Now I'll process...", "Moving on to analyze...", indicates an intended tool call that didn't execute), OR if the response seems clearly incomplete (cut off mid-thought without a natural conclusion), then the **'assistant'** should speak next.
2.  **Question to User:** If your last response ends with a direct question specifically addressed *to the user*, then the **'user'** should speak next.
3.  **Waiting for User:** If your last response completed a thought, statement, or task *and* does not meet the criteria for Rule 1 (Assistant Continues) or Rule 2 (Question to User), it implies a pause expecting user input or reaction. In this case, the **'user'** should speak next.
**Output Format:**
Respond *only* in JSON format according to the following schema. Do not include any text outside the JSON structure.
```json
{
  "type": "object",
  "properties": {
    "reasoning": {
        "type": "string",
        "description": "Brief explanation justifying the 'next_speaker' choice based *strictly* on the applicable rule and the content/structure of the preceding turn."
    },
    "next_speaker": {
      "type": "string",
      "enum": ["user", "assistant"],
      "description": "Who should speak next based *only* on the preceding turn and the decision rules."
    }
  },
  "required": ["next_speaker", "reasoning"]
}
```
"#;

const CHECK_TEMPERATURE: f32 = 0.1;

/// The schema constraint sent with the check request.
pub fn response_format() -> ResponseFormat {
    ResponseFormat {
        name: "next_speaker_response".into(),
        strict: true,
        schema: serde_json::json!({
            "type": "object",
            "properties": {
                "reasoning": {
                    "type": "string",
                    "description": "Brief explanation justifying the 'next_speaker' choice based *strictly* on the applicable rule and the content/structure of the preceding turn."
                },
                "next_speaker": {
                    "type": "string",
                    "enum": ["user", "assistant"],
                    "description": "Who should speak next based *only* on the preceding turn and the decision rules"
                }
            },
            "required": ["reasoning", "next_speaker"],
            "additionalProperties": false
        }),
    }
}

enum Precheck {
    Decided(NextSpeakerDecision),
    NoDecision,
    AskModel,
}

/// Structural rules, evaluated in order. No backend call.
fn precheck(history: &[Message]) -> Precheck {
    let Some(last) = history.last() else {
        return Precheck::Decided(NextSpeakerDecision::new(
            Speaker::User,
            "No conversation history, waiting for user input",
        ));
    };

    match last.role {
        Role::Tool => Precheck::Decided(NextSpeakerDecision::new(
            Speaker::Assistant,
            "The last message was a function response, so the assistant should speak next.",
        )),
        Role::Assistant if last.is_blank() => Precheck::Decided(NextSpeakerDecision::new(
            Speaker::Assistant,
            "The last message was a filler assistant message with no content (nothing for user to act on), assistant should speak next.",
        )),
        Role::Assistant => Precheck::AskModel,
        _ => Precheck::NoDecision,
    }
}

/// Parse the model's verdict. Anything but a well-formed decision is `None`.
fn parse_decision(content: &str) -> Option<NextSpeakerDecision> {
    serde_json::from_str(content.trim()).ok()
}

/// Decide who speaks next, or `None` when neither the structural rules nor
/// the model produce a verdict.
pub async fn check_next_speaker(
    history: &[Message],
    provider: &dyn Provider,
    model: &str,
) -> Option<NextSpeakerDecision> {
    match precheck(history) {
        Precheck::Decided(decision) => return Some(decision),
        Precheck::NoDecision => return None,
        Precheck::AskModel => {}
    }

    let mut messages = history.to_vec();
    messages.push(Message::user(CHECK_PROMPT));
    let request = ProviderRequest::new(model, messages, CHECK_TEMPERATURE)
        .with_response_format(response_format());

    match provider.complete(request).await {
        Ok(response) => {
            let decision = parse_decision(response.message.text());
            if decision.is_none() {
                debug!(content = %response.message.text(), "Unusable next-speaker verdict");
            }
            decision
        }
        Err(e) => {
            warn!(error = %e, "Next-speaker check failed");
            None
        }
    }
}

/// Simple role-based rules used when no decision was reached.
pub fn fallback(history: &[Message]) -> NextSpeakerDecision {
    let Some(last) = history.last() else {
        return NextSpeakerDecision::new(Speaker::User, "Default case, waiting for user input");
    };

    match last.role {
        Role::User => NextSpeakerDecision::new(
            Speaker::Assistant,
            "User provided input, assistant should respond",
        ),
        Role::Assistant if last.has_tool_calls() => NextSpeakerDecision::new(
            Speaker::Assistant,
            "Assistant made tool calls, needs to process results",
        ),
        Role::Tool => NextSpeakerDecision::new(
            Speaker::Assistant,
            "Tool execution completed, assistant should respond",
        ),
        Role::Assistant => NextSpeakerDecision::new(
            Speaker::User,
            "Assistant completed response, waiting for user input",
        ),
        Role::System => {
            NextSpeakerDecision::new(Speaker::User, "Default case, waiting for user input")
        }
    }
}

/// [`check_next_speaker`], falling back to [`fallback`].
pub async fn pick_next_speaker(
    history: &[Message],
    provider: &dyn Provider,
    model: &str,
) -> NextSpeakerDecision {
    match check_next_speaker(history, provider, model).await {
        Some(decision) => decision,
        None => fallback(history),
    }
}
