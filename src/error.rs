//! Error types for clinic-agent
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can surface from the agent core
#[derive(Debug, Error)]
pub enum AgentError {
    /// Tool arguments could not be parsed as structured data
    #[error("Malformed intent: {0}")]
    MalformedIntent(String),

    /// Conversation ordering violated
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Audit persistence error
    #[error("Audit error: {0}")]
    Audit(String),

    /// LLM API error
    #[error("LLM error: {0}")]
    Llm(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_intent_error() {
        let err = AgentError::MalformedIntent("expected a JSON object".to_string());
        assert_eq!(err.to_string(), "Malformed intent: expected a JSON object");
    }

    #[test]
    fn test_invalid_state_error() {
        let err = AgentError::InvalidState("tool result without decision".to_string());
        assert_eq!(err.to_string(), "Invalid state: tool result without decision");
    }

    #[test]
    fn test_llm_error() {
        let err = AgentError::Llm("rate limited".to_string());
        assert_eq!(err.to_string(), "LLM error: rate limited");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: AgentError = io_err.into();
        assert!(matches!(err, AgentError::Io(_)));
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: AgentError = json_err.into();
        assert!(matches!(err, AgentError::Json(_)));
    }
}
