//! Logger backed by the `tracing` crate

use super::traits::Logger;

/// Forwards every message to `tracing` under the `mcp_chat` target.
///
/// The binary decides where events end up by installing a subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "mcp_chat", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "mcp_chat", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "mcp_chat", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "mcp_chat", "{}", message);
    }
}
