//! Built-in tool implementations for Turnwise.
//!
//! Tools give the agent the ability to act: do math, search the web, check
//! the weather, and find local events. All but the calculator are
//! deterministic stubs.

pub mod calculator;
pub mod event_search;
pub mod weather_lookup;
pub mod web_search;

use std::sync::Arc;
use turnwise_core::tool::{Tool, ToolRegistry};

pub use calculator::CalculatorTool;
pub use event_search::EventSearchTool;
pub use weather_lookup::WeatherLookupTool;
pub use web_search::WebSearchTool;

/// Every built-in tool, freshly constructed.
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(CalculatorTool),
        Arc::new(WebSearchTool),
        Arc::new(WeatherLookupTool::new()),
        Arc::new(EventSearchTool),
    ]
}

/// Create a default tool registry with all built-in tools.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in all_tools() {
        // Built-in names are valid identifiers.
        if let Err(e) = registry.register(tool) {
            tracing::warn!(error = %e, "Skipping built-in tool");
        }
    }
    registry
}
