//! Message and Conversation domain types.
//!
//! A [`Conversation`] is the append-only log the orchestrator owns:
//! user turns, assistant turns (possibly carrying tool calls), and
//! tool-role results answering those calls. The only message ever
//! rewritten in place is the single system prompt at index 0.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions, always at index 0 when present
    System,
    /// The end user
    User,
    /// The model
    Assistant,
    /// Tool execution result
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content. Absent for assistant turns that only carry tool calls.
    #[serde(default)]
    pub content: Option<String>,

    /// Tool calls requested by the assistant, in the order the model issued them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, Some(content.into()))
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, Some(content.into()))
    }

    /// Create an assistant message that requests tool calls.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<MessageToolCall>) -> Self {
        let mut message = Self::with_role(Role::Assistant, content);
        message.tool_calls = tool_calls;
        message
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, Some(content.into()))
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut message = Self::with_role(Role::Tool, Some(content.into()));
        message.tool_call_id = Some(tool_call_id.into());
        message
    }

    /// The content as a string slice, empty when absent.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// True when the content is absent or empty.
    pub fn is_blank(&self) -> bool {
        self.text().is_empty()
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as JSON string
    pub arguments: String,
}

/// Render the temporal grounding line prepended to every system prompt.
pub fn render_time_line(now: &DateTime<Local>) -> String {
    format!("Current time: {}", now.format("%-m/%-d/%Y, %-I:%M:%S %p"))
}

/// An ordered, append-only conversation history.
///
/// Holds at most one system message, always at index 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    ///
    /// A system-role message replaces the current system message (or is
    /// inserted at index 0) instead of being appended.
    pub fn push(&mut self, message: Message) {
        if message.role == Role::System {
            self.put_system(message);
        } else {
            self.messages.push(message);
        }
    }

    /// Install a system prompt stamped with the current local time.
    pub fn set_system_prompt(&mut self, prompt: &str) {
        self.set_system_prompt_at(prompt, &Local::now());
    }

    /// Install a system prompt stamped with `now`.
    ///
    /// An empty prompt still produces a system message holding only the time line.
    pub fn set_system_prompt_at(&mut self, prompt: &str, now: &DateTime<Local>) {
        let time_line = render_time_line(now);
        let content = if prompt.is_empty() {
            time_line
        } else {
            format!("{time_line}\n\n{prompt}")
        };
        self.put_system(Message::system(content));
    }

    fn put_system(&mut self, message: Message) {
        match self.messages.first_mut() {
            Some(first) if first.role == Role::System => *first = message,
            _ => self.messages.insert(0, message),
        }
    }

    /// All messages, in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// An owned copy of the history; mutating it never touches the conversation.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn system_message(&self) -> Option<&Message> {
        self.messages.first().filter(|m| m.role == Role::System)
    }

    /// Number of leading system messages (0 or 1).
    pub fn system_count(&self) -> usize {
        usize::from(self.system_message().is_some())
    }

    /// Drop every message, optionally keeping the system prompt.
    pub fn clear(&mut self, keep_system_prompt: bool) {
        if keep_system_prompt {
            self.messages.retain(|m| m.role == Role::System);
        } else {
            self.messages.clear();
        }
    }

    /// The span between the system prompt and the last `keep_recent`
    /// messages. Empty when there is nothing to fold.
    pub fn condensable_span(&self, keep_recent: usize) -> &[Message] {
        let start = self.system_count();
        let end = self.messages.len().saturating_sub(keep_recent);
        if end <= start {
            return &[];
        }
        &self.messages[start..end]
    }

    /// Replace the condensable span with `summary`, giving
    /// `system + summary + last keep_recent`. Returns how many messages were folded.
    pub fn fold_into_summary(&mut self, summary: Message, keep_recent: usize) -> usize {
        let folded = self.condensable_span(keep_recent).len();
        if folded == 0 {
            return 0;
        }
        let start = self.system_count();
        self.messages.splice(start..start + folded, std::iter::once(summary));
        folded
    }
}
