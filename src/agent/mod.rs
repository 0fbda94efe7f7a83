//! Orchestration loop for the appointment workflow.
//!
//! This module provides:
//! - WorkflowAgent, the turn-by-turn tool-calling loop
//! - RunOutcome for representing run results
//! - Conversation state and tool invocation intents

mod conversation;
mod intent;
mod outcome;
mod policy;
mod workflow;

pub use conversation::Conversation;
pub use intent::ToolInvocationIntent;
pub use outcome::{
    DEFAULT_REFUSAL, REASON_DECISION_FAILED, REASON_INVALID_ARGUMENTS, REASON_TOOL_FAILED, REASON_UNKNOWN_TOOL,
    RunOutcome,
};
pub use policy::WORKFLOW_POLICY;
pub use workflow::{AgentConfig, RunReport, WorkflowAgent};
