//! Conversation error types

use thiserror::Error;

use crate::mcp::McpError;
use crate::providers::ProviderError;

/// Failures that abort a single query
#[derive(Error, Debug)]
pub enum ConversationError {
    /// The model call failed
    #[error("LLM request failed: {0}")]
    Provider(#[from] ProviderError),

    /// A tool invocation failed at the transport or protocol level
    #[error("Tool invocation failed: {0}")]
    Tool(#[from] McpError),
}
