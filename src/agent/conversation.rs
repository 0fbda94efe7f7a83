//! Conversation state for a single run

use crate::error::{AgentError, Result};
use crate::llm::{CompletionRequest, Message, Role, ToolDefinition};

/// Ordered message history owned by one run
///
/// Grows monotonically; a tool result is only accepted directly after the
/// assistant decision that requested it.
#[derive(Debug, Clone)]
pub struct Conversation {
    policy: String,
    messages: Vec<Message>,
}

impl Conversation {
    /// Seed with the policy preamble and the user's request
    pub fn new(policy: impl Into<String>, user_input: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            messages: vec![Message::user(user_input)],
        }
    }

    pub fn policy(&self) -> &str {
        &self.policy
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append the assistant message that selected an operation
    pub fn push_decision(&mut self, message: Message) -> Result<()> {
        if message.role != Role::Assistant || message.tool_calls.is_empty() {
            return Err(AgentError::InvalidState(
                "decision must be an assistant message with a tool call".to_string(),
            ));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Append the result for `tool_call_id`
    ///
    /// The previous message must be the decision carrying that call id.
    pub fn push_tool_result(&mut self, tool_call_id: &str, content: impl Into<String>) -> Result<()> {
        let answers_last = self
            .messages
            .last()
            .is_some_and(|m| m.role == Role::Assistant && m.tool_calls.iter().any(|c| c.id == tool_call_id));

        if !answers_last {
            return Err(AgentError::InvalidState(format!(
                "tool result {} does not follow its decision",
                tool_call_id
            )));
        }

        self.messages.push(Message::tool(tool_call_id, content));
        Ok(())
    }

    /// Build a decision request over the full history
    pub fn to_request(&self, tools: Vec<ToolDefinition>, max_tokens: Option<u32>) -> CompletionRequest {
        let mut request = CompletionRequest::new(self.policy.clone())
            .with_messages(self.messages.clone())
            .with_tools(tools);
        request.max_tokens = max_tokens;
        request
    }
}
