//! Tool registry for the conversation loop
//!
//! The ToolRegistry is the central component for:
//! - Fetching the catalog from the tool server once per session
//! - Executing tool calls requested by the LLM and correlating the results

use std::sync::Arc;
use parking_lot::RwLock;

use super::backend::ToolBackend;
use super::catalog::ToolCatalog;
use crate::logging::Logger;
use crate::mcp::{McpError, McpResult};
use crate::types::{ToolCall, ToolResult};

/// Tool registry over a single backend
pub struct ToolRegistry {
    /// Tool server used for discovery and execution
    backend: Arc<dyn ToolBackend>,
    /// Catalog from the last refresh
    catalog: RwLock<ToolCatalog>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create a new tool registry with an empty catalog
    pub fn new(backend: Arc<dyn ToolBackend>, logger: Arc<dyn Logger>) -> Self {
        Self {
            backend,
            catalog: RwLock::new(ToolCatalog::new()),
            logger,
        }
    }

    /// Fetch the catalog from the tool server
    pub async fn refresh(&self) -> McpResult<()> {
        match self.backend.list_tools().await {
            Ok(tools) => {
                self.logger.info(&format!(
                    "[ToolRegistry] Discovered {} tools from MCP server",
                    tools.len()
                ));
                *self.catalog.write() = tools.into_iter().collect();
                Ok(())
            }
            Err(e) => {
                self.logger.error(&format!("[ToolRegistry] Failed to fetch tools: {}", e));
                Err(e)
            }
        }
    }

    /// Snapshot of the cached catalog
    pub fn catalog(&self) -> ToolCatalog {
        self.catalog.read().clone()
    }

    /// Get count of available tools
    pub fn tool_count(&self) -> usize {
        self.catalog.read().len()
    }

    /// Execute a tool call from an LLM response.
    ///
    /// Transport and protocol failures are returned as errors; a result the
    /// server flagged as an error is a normal `ToolResult` with `is_error`.
    pub async fn execute_tool_call(&self, tool_call: &ToolCall) -> Result<ToolResult, McpError> {
        self.logger.info(&format!(
            "[ToolRegistry] Calling tool: {} ({})",
            tool_call.name, tool_call.id
        ));

        let output = self
            .backend
            .call_tool(&tool_call.name, tool_call.input.clone())
            .await?;

        Ok(ToolResult::from_output(tool_call.id.clone(), output))
    }

    /// Close the backend connection
    pub async fn close(&self) -> McpResult<()> {
        self.backend.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::tools::MockToolBackend;
    use crate::types::{ToolDescriptor, ToolOutput};
    use serde_json::json;

    fn registry(backend: Arc<MockToolBackend>) -> ToolRegistry {
        ToolRegistry::new(backend, Arc::new(NoOpLogger::new()))
    }

    #[tokio::test]
    async fn test_refresh_caches_catalog() {
        let backend = Arc::new(MockToolBackend::new(vec![
            ToolDescriptor::new("get", "Get a key"),
            ToolDescriptor::new("set", "Set a key"),
        ]));
        let registry = registry(backend.clone());
        assert_eq!(registry.tool_count(), 0);

        registry.refresh().await.unwrap();
        assert_eq!(registry.catalog().names(), vec!["get", "set"]);
        assert_eq!(backend.list_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_error_propagates() {
        let backend = Arc::new(MockToolBackend::new(vec![]));
        backend.fail_listing("server went away");
        let registry = registry(backend);
        assert!(matches!(registry.refresh().await, Err(McpError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_execute_tool_call_correlates_id() {
        let backend = Arc::new(MockToolBackend::new(vec![ToolDescriptor::new("set", "Set")]));
        backend.respond("set", ToolOutput::text("OK"));
        let registry = registry(backend.clone());

        let call = ToolCall::new("toolu_9", "set", json!({"key": "key", "value": "5"}));
        let result = registry.execute_tool_call(&call).await.unwrap();
        assert_eq!(result, ToolResult::success("toolu_9", "OK"));
        assert_eq!(backend.calls(), vec![("set".to_string(), json!({"key": "key", "value": "5"}))]);
    }

    #[tokio::test]
    async fn test_execute_tool_call_error_is_not_a_result() {
        let backend = Arc::new(MockToolBackend::new(vec![]));
        backend.fail_call("get", "unknown tool");
        let registry = registry(backend);

        let err = registry
            .execute_tool_call(&ToolCall::new("t1", "get", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::ToolCallFailed(ref m) if m == "unknown tool"));
    }
}
