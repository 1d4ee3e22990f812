//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to connect to a tool server over a spawned
//! stdio bridge, Streamable HTTP, or a Unix socket.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_chat_core::mcp::McpClient;
//! use mcp_chat_core::tools::ToolBackend;
//!
//! let client = McpClient::connect(&config.server, logger).await?;
//! let tools = client.list_tools().await?;
//! let output = client.call_tool("get", json!({ "key": "greeting" })).await?;
//! client.close().await?;
//! ```

mod client;

pub use client::{McpClient, McpError, McpResult};
