//! Events tool: stub listing things to do at a destination.
//!
//! Returns a deterministic set of events derived from the location, date,
//! and category, so travel conversations can be exercised offline.

use async_trait::async_trait;
use turnwise_core::error::ToolError;
use turnwise_core::tool::{Progress, Tool, ToolResult};
use turnwise_core::validation::validate_arguments;

const CATEGORIES: [&str; 5] = ["music", "food", "arts", "sports", "markets"];
const VENUES: [&str; 5] = [
    "Old Town Square",
    "Riverside Hall",
    "Central Park Pavilion",
    "Harbour Warehouse",
    "City Arena",
];
const TIMES: [&str; 4] = ["10:00", "13:30", "18:00", "20:30"];

pub struct EventSearchTool;

#[async_trait]
impl Tool for EventSearchTool {
    fn name(&self) -> &str {
        "fetch_events"
    }

    fn display_name(&self) -> &str {
        "Fetch Events"
    }

    fn description(&self) -> &str {
        "Fetch things to do based on location, date, and category"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Location to search for events"
                },
                "date": {
                    "type": "string",
                    "description": "Date to search for events (YYYY-MM-DD format)"
                },
                "category": {
                    "type": "string",
                    "description": "Category of events (e.g., music, sports, arts)"
                }
            },
            "required": ["location"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), String> {
        if params["location"].as_str().is_none_or(|l| l.trim().is_empty()) {
            return Err("Location is required and cannot be empty.".into());
        }
        validate_arguments(params, &self.parameters_schema())
    }

    fn describe(&self, params: &serde_json::Value) -> String {
        let location = params["location"].as_str().unwrap_or("any location");
        let date = params["date"].as_str().unwrap_or("any date");
        let category = params["category"].as_str().unwrap_or("any category");
        format!("Fetch events in {location} on {date} for {category}")
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        progress: Progress<'_>,
    ) -> Result<ToolResult, ToolError> {
        let location = arguments["location"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'location' argument".into()))?;
        let date = arguments["date"].as_str();
        let category = arguments["category"].as_str();

        progress.report(format!("Fetching events for {location}..."));

        let listing = EventListing {
            events: generate_mock_events(location, date, category),
        };
        let llm_content = serde_json::to_string(&listing)
            .map_err(|e| ToolError::failed(self.name(), e.to_string()))?;

        progress.report("Events data loaded successfully");

        Ok(ToolResult::new(
            llm_content,
            format!("We found {} events for {location}", listing.events.len()),
        ))
    }
}

#[derive(serde::Serialize)]
struct EventListing {
    events: Vec<Event>,
}

#[derive(serde::Serialize)]
struct Event {
    name: String,
    date: String,
    time: String,
    venue: String,
    category: String,
    description: String,
}

/// Between two and four events, stable for the same inputs.
fn generate_mock_events(location: &str, date: Option<&str>, category: Option<&str>) -> Vec<Event> {
    let hash: u32 = location
        .bytes()
        .chain(date.unwrap_or_default().bytes())
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let count = 2 + (hash % 3) as usize;
    let date = date.unwrap_or("today");

    (0..count)
        .map(|i| {
            let seed = hash as usize + i * 7;
            let category = category
                .map(str::to_string)
                .unwrap_or_else(|| CATEGORIES[seed % CATEGORIES.len()].to_string());
            let venue = VENUES[(seed / 3) % VENUES.len()];
            Event {
                name: format!("{location} {category} night #{}", i + 1),
                date: date.to_string(),
                time: TIMES[i % TIMES.len()].to_string(),
                venue: venue.to_string(),
                description: format!("A local {category} event at {venue}."),
                category,
            }
        })
        .collect()
}
