//! Workflow agent - the tool-calling orchestration loop.
//!
//! Each iteration asks the model for one decision, logs the intent, gates on
//! dry-run, validates and executes the chosen operation, and folds the result
//! back into the conversation until the terminal operation succeeds.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde_json::{Value, json};

use super::conversation::Conversation;
use super::intent::ToolInvocationIntent;
use super::outcome::{
    DEFAULT_REFUSAL, REASON_DECISION_FAILED, REASON_INVALID_ARGUMENTS, REASON_TOOL_FAILED, REASON_UNKNOWN_TOOL,
    RunOutcome,
};
use super::policy::WORKFLOW_POLICY;
use crate::audit::{AuditEventKind, AuditSink, normalize_payload};
use crate::llm::{CompletionResponse, LlmClient, Message, ToolDefinition, first_tool_call};
use crate::operations::{OperationRegistry, normalize};
use crate::schema::SchemaRegistry;

/// Configuration for the WorkflowAgent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum model decisions per run
    pub max_iterations: u32,
    /// Upper bound on a single model-decision call
    pub decision_timeout: Duration,
    /// Upper bound on a single executor call
    pub executor_timeout: Duration,
    /// Max tokens for model responses
    pub max_tokens: Option<u32>,
    /// System prompt
    pub policy: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            decision_timeout: Duration::from_secs(120),
            executor_timeout: Duration::from_secs(30),
            max_tokens: None,
            policy: WORKFLOW_POLICY.to_string(),
        }
    }
}

/// Everything a run produced, for callers that need more than the outcome
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub outcome: RunOutcome,
    pub conversation: Conversation,
    /// Model decisions requested
    pub iterations: u32,
}

enum Step {
    Continue,
    Finished(RunOutcome),
}

/// Drives one conversational run per call; safe to share across concurrent runs.
pub struct WorkflowAgent<L>
where
    L: LlmClient,
{
    llm: Arc<L>,
    schemas: Arc<SchemaRegistry>,
    operations: Arc<OperationRegistry>,
    audit: Arc<dyn AuditSink>,
    config: AgentConfig,
    tools: Vec<ToolDefinition>,
}

impl<L> WorkflowAgent<L>
where
    L: LlmClient,
{
    /// Create a new WorkflowAgent with the given dependencies.
    pub fn new(
        llm: Arc<L>,
        schemas: Arc<SchemaRegistry>,
        operations: Arc<OperationRegistry>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self::with_config(llm, schemas, operations, audit, AgentConfig::default())
    }

    /// Create a new WorkflowAgent with custom configuration.
    pub fn with_config(
        llm: Arc<L>,
        schemas: Arc<SchemaRegistry>,
        operations: Arc<OperationRegistry>,
        audit: Arc<dyn AuditSink>,
        config: AgentConfig,
    ) -> Self {
        let tools = schemas.tool_definitions();
        Self {
            llm,
            schemas,
            operations,
            audit,
            config,
            tools,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Run the workflow for one user request.
    pub async fn run_workflow(&self, user_input: &str, dry_run: bool) -> RunOutcome {
        self.run_workflow_with_report(user_input, dry_run).await.outcome
    }

    /// Run the workflow and return the outcome with the final conversation.
    pub async fn run_workflow_with_report(&self, user_input: &str, dry_run: bool) -> RunReport {
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut conversation = Conversation::new(self.config.policy.clone(), user_input);
        info!("[{}] Starting workflow run (dry_run={})", run_id, dry_run);

        let mut iterations = 0;
        let outcome = loop {
            if iterations >= self.config.max_iterations {
                warn!("[{}] Iteration budget of {} exhausted", run_id, iterations);
                self.audit.record(
                    AuditEventKind::BudgetExceeded,
                    json!({ "run_id": run_id, "input": user_input, "iterations": iterations }),
                );
                break RunOutcome::BudgetExceeded { iterations };
            }
            iterations += 1;

            // 1. Decision request - the only wait on the model
            let response = match self.request_decision(&conversation).await {
                Ok(response) => response,
                Err(detail) => {
                    warn!("[{}] Model decision failed: {}", run_id, detail);
                    self.audit.record(
                        AuditEventKind::DecisionError,
                        json!({ "run_id": run_id, "input": user_input, "error": detail }),
                    );
                    break RunOutcome::error(REASON_DECISION_FAILED);
                }
            };

            let Some(call) = first_tool_call(&response).cloned() else {
                let reason = if response.content.trim().is_empty() {
                    DEFAULT_REFUSAL.to_string()
                } else {
                    response.content.clone()
                };
                info!("[{}] Model declined: {}", run_id, reason);
                self.audit.record(
                    AuditEventKind::Refusal,
                    json!({ "run_id": run_id, "input": user_input, "reason": reason }),
                );
                break RunOutcome::Refused { reason };
            };

            if response.tool_calls.len() > 1 {
                warn!(
                    "[{}] Model selected {} operations; only {} is used",
                    run_id,
                    response.tool_calls.len(),
                    call.name
                );
            }

            let intent = ToolInvocationIntent::from(call);
            match self
                .step(&run_id, &intent, &response, &mut conversation, dry_run)
                .await
            {
                Step::Continue => continue,
                Step::Finished(outcome) => break outcome,
            }
        };

        info!("[{}] Run finished: {} after {} decision(s)", run_id, outcome.status(), iterations);
        RunReport {
            run_id,
            outcome,
            conversation,
            iterations,
        }
    }

    async fn request_decision(&self, conversation: &Conversation) -> Result<CompletionResponse, String> {
        let request = conversation.to_request(self.tools.clone(), self.config.max_tokens);

        match tokio::time::timeout(self.config.decision_timeout, self.llm.complete(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "timed out after {}ms",
                self.config.decision_timeout.as_millis()
            )),
        }
    }

    /// Handle one selected operation: log, gate, validate, execute, fold back.
    async fn step(
        &self,
        run_id: &str,
        intent: &ToolInvocationIntent,
        response: &CompletionResponse,
        conversation: &mut Conversation,
        dry_run: bool,
    ) -> Step {
        let tool = intent.operation.as_str();

        // 2. Log intent before anything is resolved or validated
        let parsed = intent.parse_arguments();
        let logged_arguments = match &parsed {
            Ok(args) => Value::Object(args.clone()),
            Err(_) => Value::String(intent.raw_arguments.clone()),
        };
        self.audit.record(
            AuditEventKind::ToolCall,
            json!({
                "run_id": run_id,
                "tool": tool,
                "arguments": logged_arguments,
                "dry_run": dry_run
            }),
        );

        // The TOOL_CALL above is the only event for an unknown name
        let (descriptor, resolved) = match (self.schemas.descriptor(tool), self.operations.resolve(tool)) {
            (Ok(descriptor), Ok(resolved)) => (descriptor, resolved),
            (Err(e), _) => return Step::Finished(self.unknown(run_id, tool, e)),
            (_, Err(e)) => return Step::Finished(self.unknown(run_id, tool, e)),
        };

        let args = match parsed {
            Ok(args) => args,
            Err(e) => return Step::Finished(self.fail(run_id, tool, e, REASON_INVALID_ARGUMENTS)),
        };

        // 3. Dry-run gate
        if dry_run {
            info!("[{}] Dry run stop at {}", run_id, tool);
            return Step::Finished(RunOutcome::DryRun {
                tool: tool.to_string(),
                arguments: Value::Object(args),
            });
        }

        // 4. Validation and execution
        let request = match descriptor.coerce(&args) {
            Ok(request) => request,
            Err(e) => return Step::Finished(self.fail(run_id, tool, e, REASON_TOOL_FAILED)),
        };

        debug!("[{}] Executing {}", run_id, tool);
        let result = match tokio::time::timeout(self.config.executor_timeout, resolved.execute(request)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => return Step::Finished(self.fail(run_id, tool, e, REASON_TOOL_FAILED)),
            Err(_) => {
                let detail = format!("timed out after {}ms", self.config.executor_timeout.as_millis());
                return Step::Finished(self.fail(run_id, tool, detail, REASON_TOOL_FAILED));
            }
        };

        // 5. Normalize per declared cardinality and fold into history
        let content = match normalize(&result, descriptor.cardinality) {
            Ok(content) => content,
            Err(e) => return Step::Finished(self.fail(run_id, tool, e, REASON_TOOL_FAILED)),
        };

        let decision = Message::assistant_with_tool_calls(response.content.clone(), vec![intent.to_tool_call()]);
        let folded = conversation
            .push_decision(decision)
            .and_then(|_| conversation.push_tool_result(&intent.correlation_id, content.to_string()));
        if let Err(e) = folded {
            return Step::Finished(self.fail(run_id, tool, e, REASON_TOOL_FAILED));
        }

        // 6. Continue or terminate
        if descriptor.terminal {
            self.audit.record(AuditEventKind::FinalOutput, normalize_payload(&result));
            return Step::Finished(RunOutcome::Completed { result });
        }

        debug!("[{}] {} returned {} record(s)", run_id, tool, result.len());
        Step::Continue
    }

    fn unknown(&self, run_id: &str, tool: &str, detail: impl Display) -> RunOutcome {
        warn!("[{}] {} is not registered: {}", run_id, tool, detail);
        RunOutcome::error(REASON_UNKNOWN_TOOL)
    }

    /// Record a VALIDATION_ERROR with the detail and return the generic outcome
    fn fail(&self, run_id: &str, tool: &str, detail: impl Display, reason: &str) -> RunOutcome {
        let detail = detail.to_string();
        warn!("[{}] {} failed: {}", run_id, tool, detail);
        self.audit.record(
            AuditEventKind::ValidationError,
            json!({ "run_id": run_id, "tool": tool, "error": detail }),
        );
        RunOutcome::error(reason)
    }
}
