//! Calculation tool: applies one arithmetic operation to two numbers.
//!
//! Division by zero is reported as an ordinary result the model can read,
//! not as a tool failure.

use async_trait::async_trait;
use turnwise_core::error::ToolError;
use turnwise_core::tool::{Progress, Tool, ToolResult};

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculation"
    }

    fn display_name(&self) -> &str {
        "Calculator"
    }

    fn description(&self) -> &str {
        "Perform basic mathematical calculations"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "a": {
                    "type": "number",
                    "description": "First number"
                },
                "b": {
                    "type": "number",
                    "description": "Second number"
                },
                "operation": {
                    "type": "string",
                    "enum": ["add", "subtract", "multiply", "divide"],
                    "description": "The mathematical operation to perform"
                }
            },
            "required": ["a", "b", "operation"]
        })
    }

    fn describe(&self, params: &serde_json::Value) -> String {
        format!(
            "Calculate {} {} {}",
            params["a"],
            params["operation"].as_str().unwrap_or("?"),
            params["b"]
        )
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        progress: Progress<'_>,
    ) -> Result<ToolResult, ToolError> {
        let a = arguments["a"]
            .as_f64()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'a' argument".into()))?;
        let b = arguments["b"]
            .as_f64()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'b' argument".into()))?;
        let operation = arguments["operation"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'operation' argument".into()))?;

        let expression = format!("{} {} {}", format_number(a), operation, format_number(b));
        progress.report(format!("calculating {expression} "));

        match calculate(a, b, operation) {
            Ok(value) => {
                let result = format_number(value);
                Ok(ToolResult::new(
                    format!("Calculation result: {result}"),
                    format!(
                        "## Calculation Result\n\n**Expression:** `{expression}`\n\n**Result:** {result}"
                    ),
                ))
            }
            Err(e) => Ok(ToolResult::new(
                format!("Calculation failed: {e}"),
                format!("## Calculation Error\n\n**Expression:** `{expression}`\n\n**Error:** {e}"),
            )),
        }
    }
}

/// Apply `operation` to `a` and `b`.
pub fn calculate(a: f64, b: f64, operation: &str) -> Result<f64, String> {
    match operation {
        "add" => Ok(a + b),
        "subtract" => Ok(a - b),
        "multiply" => Ok(a * b),
        "divide" if b == 0.0 => Err("Division by zero".into()),
        "divide" => Ok(a / b),
        other => Err(format!("Unknown operation: {other}")),
    }
}

/// Format nicely: integral values print without a trailing `.0`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
