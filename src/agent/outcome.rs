//! Workflow run outcome types.

use serde::Serialize;
use serde_json::Value;

use crate::operations::OperationResult;

/// Generic reason when the model named an unregistered operation
pub const REASON_UNKNOWN_TOOL: &str = "Unknown tool";
/// Generic reason when tool arguments were not a JSON object
pub const REASON_INVALID_ARGUMENTS: &str = "Invalid JSON arguments";
/// Generic reason for validation and executor failures
pub const REASON_TOOL_FAILED: &str = "Tool execution failed";
/// Generic reason when the model-decision call failed
pub const REASON_DECISION_FAILED: &str = "Model decision failed";
/// Used when the model declines without saying why
pub const DEFAULT_REFUSAL: &str = "Model could not determine a safe tool call";

/// Outcome of a workflow run; exactly one per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    /// Model declined; reason is the model's own text
    Refused { reason: String },
    /// Terminal failure with a generic reason
    Error { reason: String },
    /// Dry-run stop before execution
    DryRun { tool: String, arguments: Value },
    /// Terminal operation succeeded
    Completed { result: OperationResult },
    /// Iteration cap reached without completing
    BudgetExceeded { iterations: u32 },
}

impl RunOutcome {
    pub fn error(reason: impl Into<String>) -> Self {
        RunOutcome::Error { reason: reason.into() }
    }

    pub fn status(&self) -> &'static str {
        match self {
            RunOutcome::Refused { .. } => "REFUSED",
            RunOutcome::Error { .. } => "ERROR",
            RunOutcome::DryRun { .. } => "DRY_RUN",
            RunOutcome::Completed { .. } => "COMPLETED",
            RunOutcome::BudgetExceeded { .. } => "BUDGET_EXCEEDED",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}
