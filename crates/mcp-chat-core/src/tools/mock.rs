//! In-memory tool backend for tests

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::backend::ToolBackend;
use crate::mcp::{McpError, McpResult};
use crate::types::{LocalTool, ToolDescriptor, ToolOutput};

/// Tool backend with canned tools and responses.
///
/// Calls are recorded in order. A tool without a canned response answers
/// `"<name> ok"`. Mirrors `McpClient` in refusing local tool names and in
/// failing with `Closed` after `close`; repeated closes succeed.
#[derive(Default)]
pub struct MockToolBackend {
    tools: Vec<ToolDescriptor>,
    responses: Mutex<HashMap<String, ToolOutput>>,
    failures: Mutex<HashMap<String, String>>,
    listing_failure: Mutex<Option<String>>,
    calls: Mutex<Vec<(String, Value)>>,
    list_count: Mutex<usize>,
    close_count: Mutex<usize>,
}

impl MockToolBackend {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self {
            tools,
            ..Default::default()
        }
    }

    /// Canned output for a tool
    pub fn respond(&self, name: &str, output: ToolOutput) {
        self.responses.lock().insert(name.to_string(), output);
    }

    /// Make calls to `name` fail with `ToolCallFailed`
    pub fn fail_call(&self, name: &str, message: &str) {
        self.failures.lock().insert(name.to_string(), message.to_string());
    }

    /// Make `list_tools` fail with `Protocol`
    pub fn fail_listing(&self, message: &str) {
        *self.listing_failure.lock() = Some(message.to_string());
    }

    /// Every `(name, arguments)` pair received, in order
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn list_count(&self) -> usize {
        *self.list_count.lock()
    }

    /// Times `close` was called
    pub fn close_count(&self) -> usize {
        *self.close_count.lock()
    }

    fn is_closed(&self) -> bool {
        *self.close_count.lock() > 0
    }
}

#[async_trait]
impl ToolBackend for MockToolBackend {
    async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>> {
        if self.is_closed() {
            return Err(McpError::Closed);
        }
        *self.list_count.lock() += 1;
        if let Some(message) = self.listing_failure.lock().clone() {
            return Err(McpError::Protocol(message));
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolOutput> {
        if LocalTool::from_name(name).is_some() {
            return Err(McpError::LocalTool(name.to_string()));
        }
        if self.is_closed() {
            return Err(McpError::Closed);
        }

        self.calls.lock().push((name.to_string(), arguments));

        if let Some(message) = self.failures.lock().get(name) {
            return Err(McpError::ToolCallFailed(message.clone()));
        }
        Ok(self
            .responses
            .lock()
            .get(name)
            .cloned()
            .unwrap_or_else(|| ToolOutput::text(format!("{} ok", name))))
    }

    async fn close(&self) -> McpResult<()> {
        *self.close_count.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_refuses_local_tools() {
        let backend = MockToolBackend::new(vec![]);
        let err = backend.call_tool("final-tool", json!({})).await.unwrap_err();
        assert!(matches!(err, McpError::LocalTool(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_closed_backend_refuses_work() {
        let backend = MockToolBackend::new(vec![]);
        backend.close().await.unwrap();
        backend.close().await.unwrap();
        assert_eq!(backend.close_count(), 2);
        assert!(matches!(backend.call_tool("get", json!({})).await, Err(McpError::Closed)));
        assert!(matches!(backend.list_tools().await, Err(McpError::Closed)));
    }
}
