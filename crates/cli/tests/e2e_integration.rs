//! End-to-end tests for the Turnwise agent.
//!
//! These drive the full pipeline from user input to the final reply through
//! the public API: history management, tool dispatch, condensation and
//! next-speaker arbitration, against a scripted backend.

use std::sync::{Arc, Mutex};

use turnwise_agent::{Agent, Preset, StopReason};
use turnwise_core::agent::AgentConfigUpdate;
use turnwise_core::error::{Error, ProviderError};
use turnwise_core::message::{Message, MessageToolCall, Role};
use turnwise_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use turnwise_core::tool::{Progress, Tool};
use turnwise_tools::CalculatorTool;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted results in sequence and records
/// every request it sees.
struct ScriptedProvider {
    results: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    fn with_results(mut results: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        results.reverse();
        Self {
            results: Mutex::new(results),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, index: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);
        match self.results.lock().unwrap().pop() {
            Some(result) => result,
            None => panic!("ScriptedProvider exhausted: call #{}", requests.len()),
        }
    }
}

fn respond(message: Message) -> ProviderResponse {
    ProviderResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock".into(),
    }
}

fn text_response(text: &str) -> ProviderResponse {
    respond(Message::assistant(text))
}

fn tool_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    respond(Message::assistant_tool_calls(None, tool_calls))
}

fn speaker_response(next_speaker: &str, reasoning: &str) -> ProviderResponse {
    text_response(
        &serde_json::json!({ "reasoning": reasoning, "next_speaker": next_speaker }).to_string(),
    )
}

fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

fn calculator_agent(provider: Arc<ScriptedProvider>) -> Agent {
    let mut agent = Agent::new(
        provider,
        &AgentConfigUpdate {
            name: Some("Calc".into()),
            system_prompt: Some("You are a careful calculator.".into()),
            ..Default::default()
        },
    );
    agent
        .register_tool(Arc::new(CalculatorTool) as Arc<dyn Tool>)
        .unwrap();
    agent
}

fn roles(agent: &Agent) -> Vec<Role> {
    agent.history().iter().map(|m| m.role).collect()
}

// ── Scenario 1: tool round trip ──────────────────────────────────────────

#[tokio::test]
async fn e2e_calculator_tool_round_trip() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call(
            "calculation",
            serde_json::json!({"a": 2, "b": 2, "operation": "add"}),
        )]),
        text_response("2 + 2 is 4."),
        speaker_response("user", "The question was answered"),
    ]));
    let mut agent = calculator_agent(provider.clone());

    let reply = agent
        .generate_response(Some("2+2?"), Progress::none())
        .await
        .expect("generation should succeed");

    assert_eq!(reply.text(), "2 + 2 is 4.");
    assert_eq!(reply.stop, StopReason::UserTurn);
    assert_eq!(
        roles(&agent),
        vec![Role::System, Role::User, Role::Assistant, Role::Tool, Role::Assistant]
    );

    let history = agent.history();
    assert_eq!(history[2].tool_calls.len(), 1);
    assert_eq!(history[3].text(), "Calculation result: 4");

    // The follow-up completion saw the tool result.
    let follow_up = provider.request(1);
    let last = follow_up.messages.last().unwrap();
    assert_eq!(last.role, Role::Tool);
    assert_eq!(last.tool_call_id.as_deref(), Some("call_calculation"));
    assert_eq!(provider.calls(), 3);
}

// ── Scenario 2: plain reply, no continuation ─────────────────────────────

#[tokio::test]
async fn e2e_plain_reply_does_not_continue() {
    // The judgment call returns garbage, so the role-based fallback decides.
    let provider = Arc::new(ScriptedProvider::new(vec![
        text_response("Hello! How can I help you today?"),
        text_response("not json at all"),
    ]));
    let mut agent = calculator_agent(provider.clone());

    let reply = agent
        .generate_response(Some("hi there"), Progress::none())
        .await
        .unwrap();

    assert_eq!(reply.stop, StopReason::UserTurn);
    assert_eq!(reply.continuations, 0);
    assert_eq!(roles(&agent), vec![Role::System, Role::User, Role::Assistant]);
    assert_eq!(provider.calls(), 2);
}

// ── Scenario 3: configuration merge ──────────────────────────────────────

#[tokio::test]
async fn e2e_config_merge_keeps_unspecified_defaults() {
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let agent = Agent::new(
        provider,
        &AgentConfigUpdate {
            temperature: Some(0.2),
            ..Default::default()
        },
    );

    assert_eq!(agent.config().temperature, 0.2);
    assert_eq!(agent.config().max_tokens, 8192);
    assert_eq!(agent.config().model, "gpt-4");
    assert_eq!(agent.config().max_history_tokens, 64000);
}

// ── Failure handling ─────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_unknown_tool_is_reported_back_to_the_model() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call("book_flight", serde_json::json!({"to": "LIS"}))]),
        text_response("I can't book flights, sorry."),
        speaker_response("user", "Explained the limitation"),
    ]));
    let mut agent = calculator_agent(provider);

    agent
        .generate_response(Some("book me a flight"), Progress::none())
        .await
        .unwrap();

    let history = agent.history();
    assert_eq!(history[3].role, Role::Tool);
    let payload: serde_json::Value = serde_json::from_str(history[3].text()).unwrap();
    assert!(payload["error"].as_str().unwrap().contains("book_flight"));
}

#[tokio::test]
async fn e2e_backend_failure_surfaces_as_generation_error() {
    let provider = Arc::new(ScriptedProvider::with_results(vec![Err(
        ProviderError::RateLimited { retry_after_secs: 3 },
    )]));
    let mut agent = calculator_agent(provider);

    let err = agent
        .generate_response(Some("2+2?"), Progress::none())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Generation(ProviderError::RateLimited { .. })));
    assert!(err.to_string().starts_with("generation failed"));
}

// ── Continuation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_assistant_continues_then_yields() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        text_response("Next, I will look up the weather."),
        speaker_response("assistant", "Announced a next step"),
        tool_response(vec![make_tool_call(
            "fetch_weather",
            serde_json::json!({"location": "Lisbon"}),
        )]),
        text_response("It is sunny in Lisbon."),
        speaker_response("user", "Answered"),
    ]));
    let overrides = AgentConfigUpdate {
        max_history_tokens: Some(64000),
        ..Default::default()
    };
    let mut agent = Preset::Travel.build(provider.clone(), &overrides).unwrap();
    let seen = Mutex::new(Vec::<String>::new());
    let sink = |msg: &str| seen.lock().unwrap().push(msg.to_string());

    let reply = agent
        .generate_response(Some("Weather in Lisbon?"), Progress::new(&sink))
        .await
        .unwrap();

    assert_eq!(reply.continuations, 1);
    assert_eq!(reply.text(), "It is sunny in Lisbon.");
    assert_eq!(
        roles(&agent),
        vec![
            Role::System,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
            Role::Tool,
            Role::Assistant,
        ]
    );
    assert_eq!(agent.history()[3].text(), "Announced a next step");

    let progress = seen.lock().unwrap();
    assert_eq!(progress.first().map(String::as_str), Some("Fetching weather data for Lisbon..."));
    assert_eq!(progress.last().map(String::as_str), Some("Weather data loaded successfully"));
}

// ── Condensation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_long_history_is_condensed_before_completion() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        text_response("The user asked many things."),
        text_response("Sure, here is the answer."),
        speaker_response("user", "Answered"),
    ]));
    let mut agent = calculator_agent(provider.clone());
    agent
        .update_config(&AgentConfigUpdate {
            max_history_tokens: Some(50),
            ..Default::default()
        })
        .unwrap();
    for i in 0..4 {
        agent.add_message(Message::user(format!("question {i}: {}", "q".repeat(100))));
        agent.add_message(Message::assistant(format!("answer {i}: {}", "a".repeat(100))));
    }

    agent
        .generate_response(Some("one more"), Progress::none())
        .await
        .unwrap();

    // Summary request, main completion, next-speaker check.
    assert_eq!(provider.calls(), 3);
    assert!(provider.request(0).messages[0].text().contains("summarize"));

    let completion = provider.request(1);
    assert_eq!(completion.messages.len(), 7);
    assert_eq!(completion.messages[0].role, Role::System);
    assert_eq!(
        completion.messages[1].text(),
        "[CONVERSATION SUMMARY]: The user asked many things."
    );
    assert_eq!(completion.messages[6].text(), "one more");
}

// ── Presets ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_general_preset_offers_its_tools() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        text_response("Hi! I can calculate and search."),
        speaker_response("user", "Greeting"),
    ]));
    let mut agent = Preset::General
        .build(provider.clone(), &AgentConfigUpdate::default())
        .unwrap();

    agent.generate_response(Some("hello"), Progress::none()).await.unwrap();

    let request = provider.request(0);
    let names: Vec<&str> = request.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["calculation", "web_search"]);
    assert_eq!(request.model, "gpt-4.1");
    assert_eq!(request.max_tokens, Some(2000));
    assert!(agent.description().contains("calculation"));
}

#[tokio::test]
async fn e2e_travel_preset_finds_events() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call(
            "fetch_events",
            serde_json::json!({"location": "Porto", "category": "food"}),
        )]),
        text_response("There are a few food events in Porto."),
        speaker_response("user", "Answered"),
    ]));
    let overrides = AgentConfigUpdate {
        max_history_tokens: Some(64000),
        ..Default::default()
    };
    let mut agent = Preset::Travel.build(provider.clone(), &overrides).unwrap();

    let reply = agent
        .generate_response(Some("What is on in Porto?"), Progress::none())
        .await
        .unwrap();

    assert_eq!(reply.text(), "There are a few food events in Porto.");
    let request = provider.request(0);
    let names: Vec<&str> = request.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["fetch_events", "fetch_weather"]);

    let tool_message = &agent.history()[3];
    assert_eq!(tool_message.role, Role::Tool);
    let listing: serde_json::Value = serde_json::from_str(tool_message.text()).unwrap();
    assert!(listing["events"]
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["category"] == "food"));
}
