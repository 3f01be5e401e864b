//! Shared test helpers for agent tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use turnwise_core::error::ProviderError;
use turnwise_core::message::{Message, MessageToolCall};
use turnwise_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next scripted result and records
/// the request. Panics if more calls are made than results provided.
pub struct SequentialMockProvider {
    results: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::from_results(responses.into_iter().map(Ok).collect())
    }

    pub fn from_results(results: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);
        self.results.lock().unwrap().pop_front().unwrap_or_else(|| {
            panic!(
                "SequentialMockProvider: no more responses (call #{})",
                requests.len()
            )
        })
    }
}

fn wrap(message: Message) -> ProviderResponse {
    ProviderResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    wrap(Message::assistant(text))
}

/// Create a response with tool calls and no text content.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    wrap(Message::assistant_tool_calls(None, tool_calls))
}

/// Create a structured next-speaker verdict as the arbiter would receive it.
pub fn make_speaker_response(next_speaker: &str, reasoning: &str) -> ProviderResponse {
    make_text_response(
        &serde_json::json!({ "reasoning": reasoning, "next_speaker": next_speaker }).to_string(),
    )
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}
