//! mcp-chat core
//!
//! A chat loop between an LLM and the tools of a Model Context Protocol
//! server. Each query takes two phases:
//!
//! 1. **Selection**: one forced `inform-tool` call asks the model which
//!    catalog tools are relevant (`tools::ToolSelector`).
//! 2. **Conversation**: a tool-calling loop restricted to that subset plus a
//!    `final-tool` the model calls when it is done
//!    (`conversation::ConversationDriver`).
//!
//! ```rust,ignore
//! use mcp_chat_core::{ChatConfig, Session, AnthropicProvider, TracingLogger};
//! use std::sync::Arc;
//!
//! let logger = Arc::new(TracingLogger::new());
//! let config = ChatConfig::from_env()?;
//! let provider = Arc::new(AnthropicProvider::new(logger.clone()));
//!
//! let session = Session::start(config, provider, logger).await?;
//! println!("{}", session.process_query("set key=5").await?);
//! session.shutdown().await;
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;
pub mod tools;
pub mod mcp;
pub mod conversation;
pub mod session;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentBlock, MessageContent, MessageRole,
    LocalTool, ToolCall, ToolChoice, ToolDescriptor, ToolOutput, ToolResult, ToolRoute, ToolSpec,
};

pub use secrets::{SecretStore, EnvSecretStore, MemorySecretStore};

pub use logging::{Logger, SharedLogger, NoOpLogger, TracingLogger};

pub use config::{ChatConfig, ConfigError, ConfigFile, FileConfigProvider, ServerTarget};

pub use providers::{
    AnthropicProvider, GenerateOptions, GenerateResponse, MockProvider, Provider,
    ProviderError, ProviderModelConfig,
};

pub use tools::{ReducedToolSet, ToolBackend, ToolCatalog, ToolFilter, ToolRegistry, ToolSelector};

// MCP client using official rmcp SDK
pub use mcp::{McpClient, McpError, McpResult};

pub use conversation::{ConversationDriver, ConversationError};

pub use session::{Session, SessionError, SessionResult};
