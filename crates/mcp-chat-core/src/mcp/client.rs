//! MCP Client using the official rmcp SDK
//!
//! Connects to a tool server over a spawned stdio bridge, Streamable HTTP or a
//! Unix socket, and exposes it as a [`ToolBackend`].

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::{
        CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
        RawContent, Tool,
    },
    service::RunningService,
    transport::{
        ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess,
        streamable_http_client::StreamableHttpClientTransportConfig,
    },
    RoleClient,
};
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::RwLock;

#[cfg(unix)]
use tokio::net::UnixStream;

use crate::config::ServerTarget;
use crate::logging::Logger;
use crate::tools::ToolBackend;
use crate::types::{LocalTool, ToolDescriptor, ToolOutput};

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The connection has already been closed
    #[error("Connection closed")]
    Closed,

    /// A client-side tool name reached the server boundary
    #[error("'{0}' is handled locally and is never sent to the tool server")]
    LocalTool(String),
}

pub type McpResult<T> = Result<T, McpError>;

/// MCP client for a single tool server
pub struct McpClient {
    /// The underlying rmcp running service; `None` once closed
    client: RwLock<Option<RunningService<RoleClient, ClientInfo>>>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl McpClient {
    /// Connect to whatever the target names
    pub async fn connect(target: &ServerTarget, logger: Arc<dyn Logger>) -> McpResult<Self> {
        match target {
            ServerTarget::Stdio { command, args, env } => {
                Self::connect_stdio(command, args, env, logger).await
            }
            ServerTarget::Http { url, auth_token } => {
                Self::connect_http(url, auth_token.as_deref(), logger).await
            }
            #[cfg(unix)]
            ServerTarget::Unix { path } => Self::connect_unix(path, logger).await,
            #[cfg(not(unix))]
            ServerTarget::Unix { .. } => Err(McpError::ConnectionFailed(
                "Unix sockets are not supported on this platform".into(),
            )),
        }
    }

    /// Spawn a bridge process and speak MCP over its stdin/stdout
    pub async fn connect_stdio(
        command: &str,
        args: &[String],
        env: &[(String, String)],
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!("[McpClient] Spawning: {} ({} args)", command, args.len()));

        let transport = TokioChildProcess::new(Command::new(command).configure(|cmd| {
            cmd.args(args);
            for (key, value) in env {
                cmd.env(key, value);
            }
        }))
        .map_err(|e| McpError::ConnectionFailed(format!("failed to spawn '{}': {}", command, e)))?;

        let client = Self::client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Ok(Self::initialized(client, logger))
    }

    /// Connect to an MCP server over a Unix socket
    #[cfg(unix)]
    pub async fn connect_unix<P: AsRef<Path>>(
        socket_path: P,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        let path = socket_path.as_ref();
        logger.info(&format!("[McpClient] Connecting to Unix socket: {:?}", path));

        let stream = UnixStream::connect(path)
            .await
            .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;

        let client = Self::client_info()
            .serve(stream)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Ok(Self::initialized(client, logger))
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(
        url: &str,
        auth_token: Option<&str>,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!("[McpClient] Connecting to HTTP: {}", url));

        let mut config = StreamableHttpClientTransportConfig::with_uri(url);
        if let Some(token) = auth_token {
            config = config.auth_header(token);
        }
        let transport = StreamableHttpClientTransport::from_config(config);

        let client = Self::client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        Ok(Self::initialized(client, logger))
    }

    fn client_info() -> ClientInfo {
        ClientInfo {
            meta: None,
            protocol_version: Default::default(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: "mcp-chat".to_string(),
                title: Some("MCP Chat".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                website_url: None,
                icons: None,
            },
        }
    }

    fn initialized(client: RunningService<RoleClient, ClientInfo>, logger: Arc<dyn Logger>) -> Self {
        match client.peer_info() {
            Some(info) => logger.info(&format!(
                "[McpClient] Connected to {} {}",
                info.server_info.name, info.server_info.version
            )),
            None => logger.info("[McpClient] Connected and initialized successfully"),
        }
        Self {
            client: RwLock::new(Some(client)),
            logger,
        }
    }
}

#[async_trait]
impl ToolBackend for McpClient {
    async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>> {
        let guard = self.client.read().await;
        let client = guard.as_ref().ok_or(McpError::Closed)?;

        let tools = client
            .list_all_tools()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.info(&format!("[McpClient] Listed {} tools", tools.len()));

        Ok(tools.into_iter().map(descriptor_from_tool).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolOutput> {
        if LocalTool::from_name(name).is_some() {
            return Err(McpError::LocalTool(name.to_string()));
        }

        let guard = self.client.read().await;
        let client = guard.as_ref().ok_or(McpError::Closed)?;

        self.logger.info(&format!("[McpClient] Calling tool: {}", name));

        let arguments = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(McpError::ToolCallFailed(format!(
                    "arguments for '{}' must be an object, got {}",
                    name, other
                )))
            }
        };

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments,
            task: None,
        };

        let result = client
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))?;

        let output = render_result(&result);
        if output.is_error {
            self.logger.warn(&format!("[McpClient] Tool '{}' reported an error", name));
        }
        Ok(output)
    }

    async fn close(&self) -> McpResult<()> {
        let Some(client) = self.client.write().await.take() else {
            return Ok(());
        };

        self.logger.info("[McpClient] Closing connection");
        client
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

fn descriptor_from_tool(tool: Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
        input_schema: Value::Object((*tool.input_schema).clone()),
    }
}

/// Flatten a tool result into text: text items joined by newlines, anything
/// else as its JSON form
fn render_result(result: &CallToolResult) -> ToolOutput {
    let mut parts: Vec<String> = result
        .content
        .iter()
        .map(|item| match &item.raw {
            RawContent::Text(text) => text.text.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        })
        .collect();

    if parts.is_empty() {
        if let Some(structured) = &result.structured_content {
            parts.push(structured.to_string());
        }
    }

    ToolOutput {
        content: parts.join("\n"),
        is_error: result.is_error.unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::Content;
    use serde_json::json;

    #[test]
    fn test_render_text_content() {
        let result = CallToolResult::success(vec![Content::text("line one"), Content::text("line two")]);
        let output = render_result(&result);
        assert_eq!(output.content, "line one\nline two");
        assert!(!output.is_error);
    }

    #[test]
    fn test_render_error_flag() {
        let result = CallToolResult::error(vec![Content::text("key not found")]);
        let output = render_result(&result);
        assert_eq!(output.content, "key not found");
        assert!(output.is_error);
    }

    #[test]
    fn test_render_structured_only() {
        let mut result = CallToolResult::success(vec![]);
        result.structured_content = Some(json!({"count": 3}));
        assert_eq!(render_result(&result).content, r#"{"count":3}"#);
    }

    #[test]
    fn test_descriptor_from_tool() {
        let schema = json!({"type": "object", "properties": {"key": {"type": "string"}}});
        let tool = Tool::new(
            "get",
            "Get the value of a key.\nReturns nil when missing.",
            Arc::new(schema.as_object().cloned().unwrap_or_default()),
        );
        let descriptor = descriptor_from_tool(tool);
        assert_eq!(descriptor.name, "get");
        assert_eq!(descriptor.summary(), "Get the value of a key.");
        assert_eq!(descriptor.input_schema, schema);
    }

    #[tokio::test]
    async fn test_connect_stdio_missing_binary() {
        let logger: Arc<dyn Logger> = Arc::new(crate::logging::NoOpLogger::new());
        let result = McpClient::connect_stdio("definitely-not-a-real-mcp-bridge", &[], &[], logger).await;
        assert!(matches!(result, Err(McpError::ConnectionFailed(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_connect_unix_missing_socket() {
        let dir = tempfile::tempdir().unwrap();
        let logger: Arc<dyn Logger> = Arc::new(crate::logging::NoOpLogger::new());
        let result = McpClient::connect_unix(dir.path().join("absent.sock"), logger).await;
        assert!(matches!(result, Err(McpError::ConnectionFailed(_))));
    }
}
