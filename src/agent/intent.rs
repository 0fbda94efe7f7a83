//! Tool invocation intent produced by a model decision

use serde_json::{Map, Value};

use crate::error::Result;
use crate::llm::{ToolCall, parse_arguments};

/// One operation selected by the model, consumed exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocationIntent {
    pub operation: String,
    /// Arguments exactly as the model sent them
    pub raw_arguments: String,
    pub correlation_id: String,
}

impl ToolInvocationIntent {
    /// Parse the raw arguments into a JSON object
    pub fn parse_arguments(&self) -> Result<Map<String, Value>> {
        parse_arguments(&self.raw_arguments)
    }

    /// The call as it is echoed back into the conversation
    pub fn to_tool_call(&self) -> ToolCall {
        ToolCall::new(&self.correlation_id, &self.operation, &self.raw_arguments)
    }
}

impl From<ToolCall> for ToolInvocationIntent {
    fn from(call: ToolCall) -> Self {
        Self {
            operation: call.name,
            raw_arguments: call.arguments,
            correlation_id: call.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tool_call_round_trip() {
        let call = ToolCall::new("call_9", "search_patient", r#"{"name":"Ravi Kumar"}"#);
        let intent = ToolInvocationIntent::from(call.clone());

        assert_eq!(intent.operation, "search_patient");
        assert_eq!(intent.correlation_id, "call_9");
        assert_eq!(intent.to_tool_call(), call);
    }

    #[test]
    fn test_parse_arguments() {
        let intent = ToolInvocationIntent::from(ToolCall::new("c", "search_patient", r#"{"name":"Ravi"}"#));
        assert_eq!(intent.parse_arguments().unwrap()["name"], "Ravi");

        let bad = ToolInvocationIntent::from(ToolCall::new("c", "search_patient", "name=Ravi"));
        assert!(bad.parse_arguments().is_err());
    }
}
