//! Parsing for chat-completions responses and tool-call arguments
//!
//! Extracts tool calls from the raw API body and turns the model's argument
//! strings into structured JSON.

use serde_json::{Map, Value};

use crate::error::{AgentError, Result};
use crate::llm::types::{CompletionResponse, StopReason, ToolCall, Usage};

/// Parse a raw chat-completions body into a CompletionResponse
///
/// Only the first choice is considered.
pub fn parse_response(response: &Value) -> Result<CompletionResponse> {
    let choice = response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| AgentError::Llm("response has no choices".to_string()))?;

    let message = choice
        .get("message")
        .ok_or_else(|| AgentError::Llm("choice has no message".to_string()))?;

    let content = message
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string();

    let tool_calls = message
        .get("tool_calls")
        .and_then(|t| t.as_array())
        .map(|calls| calls.iter().filter_map(parse_tool_call_block).collect())
        .unwrap_or_default();

    let stop_reason = choice
        .get("finish_reason")
        .and_then(|s| s.as_str())
        .map(parse_stop_reason)
        .unwrap_or_default();

    let usage = response.get("usage").map(parse_usage).unwrap_or_default();

    Ok(CompletionResponse {
        content,
        tool_calls,
        stop_reason,
        usage,
    })
}

/// Parse a single `tool_calls` entry into a ToolCall
fn parse_tool_call_block(block: &Value) -> Option<ToolCall> {
    let id = block.get("id").and_then(|v| v.as_str())?.to_string();
    let function = block.get("function")?;
    let name = function.get("name").and_then(|v| v.as_str())?.to_string();

    // Some providers send arguments as an object rather than a string
    let arguments = match function.get("arguments") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    Some(ToolCall { id, name, arguments })
}

/// Parse finish_reason string into StopReason enum
fn parse_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "tool_calls" | "function_call" => StopReason::ToolUse,
        "length" => StopReason::MaxTokens,
        "content_filter" => StopReason::ContentFilter,
        _ => StopReason::EndTurn,
    }
}

/// Parse usage object from response
fn parse_usage(usage: &Value) -> Usage {
    Usage {
        input_tokens: usage.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0),
        output_tokens: usage.get("completion_tokens").and_then(|v| v.as_u64()).unwrap_or(0),
    }
}

/// Parse a tool call's raw argument string into a JSON object
///
/// Anything that is not a JSON object is a malformed intent.
pub fn parse_arguments(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AgentError::MalformedIntent(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(AgentError::MalformedIntent(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// First tool call of a response, if the model selected any
pub fn first_tool_call(response: &CompletionResponse) -> Option<&ToolCall> {
    response.tool_calls.first()
}
