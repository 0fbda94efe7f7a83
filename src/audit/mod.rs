//! Audit trail for compliance review
//!
//! Every decision point of a run is appended as one timestamped event.
//! Sinks are best-effort: a persistence failure is reported on the diagnostic
//! log and never changes the outcome of the run.

mod jsonl;
mod memory;

pub use jsonl::{JsonlAuditSink, read_events};
pub use memory::MemoryAuditSink;

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of decision point being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventKind {
    /// Model declined to select an operation
    Refusal,
    /// Model selected an operation; logged before validation
    ToolCall,
    /// Arguments or executor failed
    ValidationError,
    /// Terminal operation succeeded
    FinalOutput,
    /// Model-decision call failed or timed out
    DecisionError,
    /// Iteration cap reached
    BudgetExceeded,
}

impl AuditEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventKind::Refusal => "REFUSAL",
            AuditEventKind::ToolCall => "TOOL_CALL",
            AuditEventKind::ValidationError => "VALIDATION_ERROR",
            AuditEventKind::FinalOutput => "FINAL_OUTPUT",
            AuditEventKind::DecisionError => "DECISION_ERROR",
            AuditEventKind::BudgetExceeded => "BUDGET_EXCEEDED",
        }
    }
}

impl std::fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// ISO-8601 UTC timestamp
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventKind,
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventKind, payload: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            payload,
        }
    }
}

/// Append-only destination for audit events
///
/// Implementations must write each event as one indivisible unit and keep
/// append order; they must not fail the caller.
pub trait AuditSink: Send + Sync {
    fn record(&self, kind: AuditEventKind, payload: Value);
}

/// Reduce a payload to JSON
///
/// Typed records become their field mapping and dates ISO-8601 strings (via
/// their `Serialize` impls); anything that fails to serialize falls back to
/// its debug string form.
pub fn normalize_payload<T: Serialize + Debug + ?Sized>(payload: &T) -> Value {
    serde_json::to_value(payload).unwrap_or_else(|e| {
        log::warn!("Audit payload not serializable ({}), storing string form", e);
        Value::String(format!("{:?}", payload))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Patient;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&AuditEventKind::ToolCall).unwrap(), "\"TOOL_CALL\"");
        assert_eq!(
            serde_json::to_string(&AuditEventKind::ValidationError).unwrap(),
            "\"VALIDATION_ERROR\""
        );
        assert_eq!(AuditEventKind::FinalOutput.to_string(), "FINAL_OUTPUT");
    }

    #[test]
    fn test_kind_as_str_matches_serde() {
        let kinds = [
            AuditEventKind::Refusal,
            AuditEventKind::ToolCall,
            AuditEventKind::ValidationError,
            AuditEventKind::FinalOutput,
            AuditEventKind::DecisionError,
            AuditEventKind::BudgetExceeded,
        ];
        for kind in kinds {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
    }

    #[test]
    fn test_event_line_shape() {
        let event = AuditEvent::new(AuditEventKind::Refusal, serde_json::json!({ "reason": "no" }));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event_type"], "REFUSAL");
        assert_eq!(json["payload"]["reason"], "no");
        let ts = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_normalize_typed_record() {
        let patient = Patient {
            patient_id: "PAT-123".to_string(),
            name: "Ravi Kumar".to_string(),
            dob: NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
        };

        let value = normalize_payload(&patient);
        assert_eq!(value["patient_id"], "PAT-123");
        assert_eq!(value["dob"], "1985-06-15");
    }

    #[test]
    fn test_normalize_falls_back_to_string() {
        // Non-string map keys cannot become JSON object keys
        let mut map: HashMap<(u8, u8), &str> = HashMap::new();
        map.insert((1, 2), "x");

        let value = normalize_payload(&map);
        assert!(value.is_string());
        assert!(value.as_str().unwrap().contains("(1, 2)"));
    }
}
