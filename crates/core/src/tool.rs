//! Tool trait: the abstraction over agent capabilities.
//!
//! Every tool exposes the same capability set (schema, validate, describe,
//! execute) and is looked up by a validated [`ToolName`]. Dispatching a
//! model-issued call always yields a [`ToolOutcome`]; "not found" and
//! "failed" are ordinary outcomes that become tool-role messages, so the
//! conversation can carry on and the model can react.

use crate::error::ToolError;
use crate::message::{Message, MessageToolCall};
use crate::provider::ToolDefinition;
use crate::validation::validate_arguments;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A tool identifier as used by the model and the registry.
///
/// 1-64 characters of `[A-Za-z0-9_-]`, the function-name alphabet accepted
/// by OpenAI-compatible backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolName(String);

impl ToolName {
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        let valid = !raw.is_empty()
            && raw.len() <= 64
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(ToolError::InvalidName(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ToolName {
    type Error = ToolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ToolName> for String {
    fn from(name: ToolName) -> Self {
        name.0
    }
}

impl Borrow<str> for ToolName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Parse the serialized argument blob of a model-issued call.
    /// An empty blob means "no arguments".
    pub fn from_message(call: &MessageToolCall) -> Result<Self, ToolError> {
        let raw = call.arguments.trim();
        let arguments = if raw.is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(raw)
                .map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {e}")))?
        };
        Ok(Self {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments,
        })
    }
}

/// The result of a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Fed back into the conversation; machine-parseable, usually JSON
    pub llm_content: String,

    /// Human-oriented summary, markdown-flavored
    pub return_display: String,
}

impl ToolResult {
    pub fn new(llm_content: impl Into<String>, return_display: impl Into<String>) -> Self {
        Self {
            llm_content: llm_content.into(),
            return_display: return_display.into(),
        }
    }
}

/// Signature of a progress sink.
pub type ProgressFn<'a> = dyn Fn(&str) + Send + Sync + 'a;

/// Optional side channel for free-text progress updates.
///
/// May be absent, may be called any number of times, and never influences
/// control flow. Reporting to an absent sink is a no-op.
#[derive(Clone, Copy, Default)]
pub struct Progress<'a> {
    sink: Option<&'a ProgressFn<'a>>,
}

impl<'a> Progress<'a> {
    pub fn none() -> Self {
        Self { sink: None }
    }

    pub fn new(sink: &'a ProgressFn<'a>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn report(&self, message: impl AsRef<str>) {
        if let Some(sink) = self.sink {
            sink(message.as_ref());
        }
    }

    pub fn is_attached(&self) -> bool {
        self.sink.is_some()
    }
}

impl std::fmt::Debug for Progress<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// The core Tool trait.
///
/// Tools are independent structs implementing this capability set; the
/// registry holds them behind `Arc<dyn Tool>`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable identifier used by the model and for registry lookup.
    fn name(&self) -> &str;

    /// User-facing name.
    fn display_name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Whether `return_display` should be rendered as markdown.
    fn is_output_markdown(&self) -> bool {
        true
    }

    /// Whether the tool reports live progress.
    fn can_update_output(&self) -> bool {
        false
    }

    /// Check parameters before execution. The default checks them against
    /// [`Tool::parameters_schema`].
    fn validate(&self, params: &serde_json::Value) -> Result<(), String> {
        validate_arguments(params, &self.parameters_schema())
    }

    /// One-line human description of what a call with `params` will do.
    fn describe(&self, params: &serde_json::Value) -> String {
        params.to_string()
    }

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        params: serde_json::Value,
        progress: Progress<'_>,
    ) -> Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// What happened when a model-issued tool call was dispatched.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    /// The tool ran and produced a result
    Completed(ToolResult),
    /// No tool is registered under the requested name
    NotFound { name: String },
    /// Arguments were rejected or the tool itself failed
    Failed { error: ToolError },
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Completed(_))
    }

    /// The text fed back to the model. Errors are serialized as
    /// `{"error": "..."}`.
    pub fn llm_content(&self) -> String {
        match self {
            ToolOutcome::Completed(result) => result.llm_content.clone(),
            ToolOutcome::NotFound { name } => error_payload(&ToolError::NotFound(name.clone()).to_string()),
            ToolOutcome::Failed { error } => error_payload(&error.to_string()),
        }
    }

    /// Turn the outcome into the tool-role message answering `call_id`.
    pub fn into_message(self, call_id: &str) -> Message {
        Message::tool_result(call_id, self.llm_content())
    }
}

fn error_payload(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// A registry of available tools, keyed by [`ToolName`].
///
/// Registering a second tool under an existing name replaces the first.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<ToolName, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = ToolName::parse(tool.name())?;
        if self.tools.insert(name.clone(), tool).is_some() {
            debug!(tool = %name, "Replaced previously registered tool");
        }
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Tool definitions for the completion API, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(ToolName::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a model-issued call: look up, parse, validate, execute.
    ///
    /// Never fails; every problem is reported as a [`ToolOutcome`].
    pub async fn dispatch(&self, call: &MessageToolCall, progress: Progress<'_>) -> ToolOutcome {
        let Some(tool) = self.tools.get(call.name.as_str()) else {
            warn!(tool = %call.name, "Model requested an unregistered tool");
            return ToolOutcome::NotFound {
                name: call.name.clone(),
            };
        };

        let parsed = match ToolCall::from_message(call) {
            Ok(parsed) => parsed,
            Err(error) => return ToolOutcome::Failed { error },
        };

        if let Err(reason) = tool.validate(&parsed.arguments) {
            return ToolOutcome::Failed {
                error: ToolError::InvalidArguments(reason),
            };
        }

        debug!(tool = %call.name, call_id = %call.id, action = %tool.describe(&parsed.arguments), "Executing tool");

        match tool.execute(parsed.arguments, progress).await {
            Ok(result) => ToolOutcome::Completed(result),
            Err(error) => {
                warn!(tool = %call.name, error = %error, "Tool execution failed");
                ToolOutcome::Failed { error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn display_name(&self) -> &str {
            "Echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
            progress: Progress<'_>,
        ) -> Result<ToolResult, ToolError> {
            let text = arguments["text"].as_str().unwrap_or("").to_string();
            if text == "boom" {
                return Err(ToolError::failed("echo", "refusing to echo boom"));
            }
            progress.report(format!("echoing {text}"));
            Ok(ToolResult::new(text.clone(), format!("**{text}**")))
        }
    }

    fn call(name: &str, arguments: &str) -> MessageToolCall {
        MessageToolCall {
            id: "call_1".into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        registry
    }

    #[test]
    fn tool_name_validation() {
        assert!(ToolName::parse("fetch_weather").is_ok());
        assert!(ToolName::parse("web-search2").is_ok());
        assert!(ToolName::parse("").is_err());
        assert!(ToolName::parse("has space").is_err());
        assert!(ToolName::parse(&"x".repeat(65)).is_err());
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = registry();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.names(), vec!["echo"]);
    }

    #[test]
    fn registry_last_registration_wins() {
        let mut registry = registry();
        registry.register(Arc::new(EchoTool)).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_definitions() {
        let defs = registry().definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "echo");
        assert_eq!(defs[0].description, "Echoes back the input");
    }

    #[test]
    fn progress_sink_may_borrow_local_state() {
        let mut lines = Vec::new();
        {
            let collected = Mutex::new(&mut lines);
            let sink = |msg: &str| collected.lock().unwrap().push(msg.to_string());
            let progress = Progress::new(&sink);
            assert!(progress.is_attached());
            progress.report("step 1");
            progress.report(String::from("step 2"));
        }
        assert_eq!(lines, ["step 1", "step 2"]);

        Progress::none().report("dropped");
        assert!(!Progress::none().is_attached());
    }

    #[tokio::test]
    async fn dispatch_completes_and_reports_progress() {
        let seen = Mutex::new(Vec::new());
        let sink = |msg: &str| seen.lock().unwrap().push(msg.to_string());
        let outcome = registry()
            .dispatch(&call("echo", r#"{"text":"hello world"}"#), Progress::new(&sink))
            .await;

        match outcome {
            ToolOutcome::Completed(result) => assert_eq!(result.llm_content, "hello world"),
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(seen.lock().unwrap().as_slice(), ["echoing hello world"]);
    }

    #[tokio::test]
    async fn dispatch_missing_tool_is_an_outcome() {
        let outcome = registry().dispatch(&call("nonexistent", "{}"), Progress::none()).await;
        assert!(matches!(outcome, ToolOutcome::NotFound { .. }));

        let message = outcome.into_message("call_1");
        let payload: serde_json::Value = serde_json::from_str(message.text()).unwrap();
        assert_eq!(payload["error"], "Function nonexistent not found");
        assert_eq!(message.tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn dispatch_rejects_invalid_arguments() {
        let outcome = registry().dispatch(&call("echo", "{}"), Progress::none()).await;
        let payload: serde_json::Value = serde_json::from_str(&outcome.llm_content()).unwrap();
        assert!(payload["error"].as_str().unwrap().contains("missing required field 'text'"));
    }

    #[tokio::test]
    async fn dispatch_rejects_malformed_json() {
        let outcome = registry().dispatch(&call("echo", "{not json"), Progress::none()).await;
        assert!(matches!(
            outcome,
            ToolOutcome::Failed {
                error: ToolError::InvalidArguments(_)
            }
        ));
    }

    #[tokio::test]
    async fn dispatch_converts_tool_failure() {
        let outcome = registry()
            .dispatch(&call("echo", r#"{"text":"boom"}"#), Progress::none())
            .await;
        let payload: serde_json::Value = serde_json::from_str(&outcome.llm_content()).unwrap();
        assert!(payload["error"].as_str().unwrap().contains("refusing to echo boom"));
    }

    #[test]
    fn progress_without_sink_is_noop() {
        let progress = Progress::none();
        progress.report("nobody listens");
        assert!(!progress.is_attached());
    }
}
