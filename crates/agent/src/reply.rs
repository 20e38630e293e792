//! Parsing of model replies that are expected to be JSON objects.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use splitscore_core::ProcessError;

/// A single fence wrapping the whole reply; the body is captured.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```(?:json|JSON)?\s*(.*?)\s*```\s*$").expect("valid code fence pattern")
});

/// Unwrap a Markdown code fence enclosing the entire reply.
///
/// Backticks anywhere else are content and are left alone.
pub fn strip_code_fence(reply: &str) -> &str {
    match CODE_FENCE.captures(reply).and_then(|c| c.get(1)) {
        Some(body) => body.as_str(),
        None => reply.trim(),
    }
}

/// Parse a reply (optionally fenced) into a JSON object.
pub fn parse_object(reply: &str) -> Result<Map<String, Value>, ProcessError> {
    match serde_json::from_str::<Value>(strip_code_fence(reply)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ProcessError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ProcessError::MalformedResponse(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
