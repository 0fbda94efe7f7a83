//! LLM Client Layer - chat-completions integration and tool-call parsing
//!
//! This module provides:
//! - Message types for model-decision requests
//! - LlmClient trait for API abstraction
//! - OpenAiClient implementation (OpenRouter compatible)
//! - Tool call and argument parsing

pub mod client;
pub mod openai;
pub mod tool_parser;
pub mod types;

pub use client::{LlmClient, LlmError, MockLlmClient};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use tool_parser::{first_tool_call, parse_arguments, parse_response};
pub use types::{
    CompletionRequest, CompletionResponse, Message, Role, StopReason, ToolCall, ToolChoice, ToolDefinition, Usage,
};
