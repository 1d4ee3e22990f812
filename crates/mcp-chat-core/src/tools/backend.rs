//! Tool server abstraction

use async_trait::async_trait;
use serde_json::Value;

use crate::mcp::McpResult;
use crate::types::{ToolDescriptor, ToolOutput};

/// Something that lists and runs tools on behalf of the LLM.
///
/// `McpClient` is the production implementation; `MockToolBackend` serves tests.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    /// Every tool the server offers, in the server's order
    async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>>;

    /// Invoke one tool with the given arguments
    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolOutput>;

    /// Release the connection. Calling it again is a no-op.
    async fn close(&self) -> McpResult<()>;
}
