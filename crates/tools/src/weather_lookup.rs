//! Weather tool: stub that returns mock weather data.
//!
//! In production this would call a real weather API. The stub returns
//! plausible, deterministic data so the agent loop can be exercised
//! end-to-end without network access.

use async_trait::async_trait;
use std::time::Duration;
use turnwise_core::error::ToolError;
use turnwise_core::tool::{Progress, Tool, ToolResult};
use turnwise_core::validation::validate_arguments;

#[derive(Default)]
pub struct WeatherLookupTool {
    latency: Duration,
}

impl WeatherLookupTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a slow upstream between the two progress reports.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl Tool for WeatherLookupTool {
    fn name(&self) -> &str {
        "fetch_weather"
    }

    fn display_name(&self) -> &str {
        "Fetch Weather"
    }

    fn description(&self) -> &str {
        "Fetch weather information for a specified location"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Location to get weather for (city)"
                },
                "date": {
                    "type": "string",
                    "description": "Date for weather forecast (YYYY-MM-DD format, optional)"
                },
                "units": {
                    "type": "string",
                    "enum": ["metric", "imperial"],
                    "description": "Temperature units (metric for Celsius, imperial for Fahrenheit)"
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
        let location = params["location"].as_str().unwrap_or_default();
        match params["date"].as_str() {
            Some(date) => format!("Fetch weather information for {location} on {date}"),
            None => format!("Fetch weather information for {location}"),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        progress: Progress<'_>,
    ) -> Result<ToolResult, ToolError> {
        let location = arguments["location"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'location' argument".into()))?;
        let units = arguments["units"].as_str().unwrap_or("metric");
        let date = arguments["date"].as_str();

        progress.report(format!("Fetching weather data for {location}..."));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let weather = generate_mock_weather(location, date, units);
        let llm_content = serde_json::to_string(&weather)
            .map_err(|e| ToolError::failed(self.name(), e.to_string()))?;

        progress.report("Weather data loaded successfully");

        Ok(ToolResult::new(
            llm_content,
            format!(
                "Weather for {location}: {}{}, {}",
                weather.temperature, weather.units, weather.condition
            ),
        ))
    }
}

#[derive(serde::Serialize)]
struct WeatherData {
    location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    temperature: f64,
    feels_like: f64,
    units: String,
    condition: String,
    humidity: u32,
}

/// Generate deterministic mock weather based on location name hash.
fn generate_mock_weather(location: &str, date: Option<&str>, units: &str) -> WeatherData {
    // Simple hash for deterministic but varied results.
    let hash: u32 = location
        .bytes()
        .chain(date.unwrap_or_default().bytes())
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));

    let conditions = [
        "Clear skies",
        "Partly cloudy",
        "Overcast",
        "Light rain",
        "Heavy rain",
        "Thunderstorms",
        "Snow",
        "Foggy",
    ];

    let base_temp_c = ((hash % 40) as f64) - 5.0; // -5 to 35°C
    let wind_chill_c = ((hash / 40) % 5) as f64;
    let convert = |c: f64| {
        let value = if units == "imperial" { c * 9.0 / 5.0 + 32.0 } else { c };
        (value * 10.0).round() / 10.0
    };

    WeatherData {
        location: location.to_string(),
        date: date.map(str::to_string),
        temperature: convert(base_temp_c),
        feels_like: convert(base_temp_c - wind_chill_c),
        units: if units == "imperial" { "°F" } else { "°C" }.to_string(),
        condition: conditions[(hash as usize / 7) % conditions.len()].to_string(),
        humidity: 30 + (hash % 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn lookup_returns_weather() {
        let tool = WeatherLookupTool::new();
        let result = tool
            .execute(serde_json::json!({"location": "Tokyo"}), Progress::none())
            .await
            .unwrap();

        let data: serde_json::Value = serde_json::from_str(&result.llm_content).unwrap();
        assert_eq!(data["location"], "Tokyo");
        assert!(data["temperature"].is_number());
        assert!(data["feels_like"].is_number());
        assert!(result.return_display.starts_with("Weather for Tokyo: "));
    }

    #[tokio::test]
    async fn imperial_units() {
        let tool = WeatherLookupTool::new();
        let result = tool
            .execute(
                serde_json::json!({"location": "New York", "units": "imperial"}),
                Progress::none(),
            )
            .await
            .unwrap();

        assert!(result.llm_content.contains("°F"));
    }

    #[tokio::test]
    async fn deterministic_results() {
        let tool = WeatherLookupTool::new();
        let args = serde_json::json!({"location": "London", "date": "2025-07-01"});
        let r1 = tool.execute(args.clone(), Progress::none()).await.unwrap();
        let r2 = tool.execute(args, Progress::none()).await.unwrap();

        assert_eq!(r1.llm_content, r2.llm_content);
    }

    #[tokio::test(start_paused = true)]
    async fn reports_progress_around_latency() {
        let seen = Mutex::new(Vec::new());
        let sink = |msg: &str| seen.lock().unwrap().push(msg.to_string());
        let tool = WeatherLookupTool::new().with_latency(Duration::from_secs(1));

        tool.execute(serde_json::json!({"location": "Paris"}), Progress::new(&sink))
            .await
            .unwrap();

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["Fetching weather data for Paris...", "Weather data loaded successfully"]
        );
    }

    #[test]
    fn blank_location_rejected() {
        let tool = WeatherLookupTool::new();
        assert_eq!(
            tool.validate(&serde_json::json!({"location": "  "})),
            Err("Location is required and cannot be empty.".to_string())
        );
        assert!(tool.validate(&serde_json::json!({})).is_err());
        assert!(
            tool.validate(&serde_json::json!({"location": "Oslo", "units": "kelvin"}))
                .is_err()
        );
    }

    #[test]
    fn describe_mentions_date() {
        let tool = WeatherLookupTool::new();
        assert_eq!(
            tool.describe(&serde_json::json!({"location": "Rome", "date": "2025-05-01"})),
            "Fetch weather information for Rome on 2025-05-01"
        );
    }

    #[test]
    fn tool_definition() {
        let def = WeatherLookupTool::new().to_definition();
        assert_eq!(def.name, "fetch_weather");
    }
}
