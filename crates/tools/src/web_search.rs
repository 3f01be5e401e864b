//! Web search tool: stub that returns mock search results.
//!
//! In production this would call a real search API. The stub returns
//! plausible results so the agent loop can be tested end-to-end without
//! network access.

use async_trait::async_trait;
use serde::Serialize;
use turnwise_core::error::ToolError;
use turnwise_core::tool::{Progress, Tool, ToolResult};
use turnwise_core::validation::validate_arguments;

pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn display_name(&self) -> &str {
        "Web Search"
    }

    fn description(&self) -> &str {
        "Performs a web search and returns the results. This tool is useful for finding information on the internet based on a query."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to find information on the web."
                }
            },
            "required": ["query"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), String> {
        if params["query"].as_str().is_none_or(|q| q.trim().is_empty()) {
            return Err("Query is required and cannot be empty.".into());
        }
        validate_arguments(params, &self.parameters_schema())
    }

    fn describe(&self, params: &serde_json::Value) -> String {
        format!(
            "Searching the web for: \"{}\"",
            params["query"].as_str().unwrap_or_default()
        )
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        progress: Progress<'_>,
    ) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        progress.report(format!("searching for {query}..."));

        let results = generate_mock_results(query);
        let llm_content = serde_json::to_string(&results)
            .map_err(|e| ToolError::failed(self.name(), e.to_string()))?;

        progress.report("Search results loaded successfully");

        Ok(ToolResult::new(
            llm_content,
            format!("Search results for {query}: {}", results.search_data),
        ))
    }
}

#[derive(Debug, Clone, Serialize)]
struct SearchResults {
    search_data: String,
    sources: Vec<Source>,
}

#[derive(Debug, Clone, Serialize)]
struct Source {
    name: String,
}

fn source(name: &str) -> Source {
    Source { name: name.into() }
}

fn generate_mock_results(query: &str) -> SearchResults {
    let q = query.to_lowercase();

    // Context-aware mock results for common topics.
    if q.contains("rust") {
        return SearchResults {
            search_data: "Rust is a systems programming language focused on safety, speed, and concurrency. \
                          The official book and Rust by Example are the usual starting points."
                .into(),
            sources: vec![
                source("The Rust Programming Language (doc.rust-lang.org/book)"),
                source("Rust by Example (doc.rust-lang.org/rust-by-example)"),
            ],
        };
    }

    if q.contains("weather") {
        return SearchResults {
            search_data: "National weather services and OpenWeatherMap publish current conditions \
                          and multi-day forecasts for most locations."
                .into(),
            sources: vec![source("weather.gov"), source("openweathermap.org")],
        };
    }

    // Generic fallback.
    SearchResults {
        search_data: format!(
            "This is a mock search result for the query '{query}'. In production, this would contain real content."
        ),
        sources: vec![source(&format!("https://example.com/search?q={}", query.replace(' ', "+")))],
    }
}
