//! File-based configuration (YAML)
//!
//! Optional user-level file at `~/.config/mcp-chat/config.yaml`, or any path
//! named by `MCP_CHAT_CONFIG`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::ConfigResult;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    /// LLM settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Tool server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Conversation loop settings
    #[serde(default)]
    pub chat: ChatSettings,
}

/// LLM section of the config file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LlmSettings {
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub max_tokens: Option<u32>,
}

/// Tool server section of the config file
///
/// At most one of `url`, `socket` and `command` is used, in that order.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServerSettings {
    /// Streamable HTTP endpoint
    pub url: Option<String>,
    /// Unix socket path
    pub socket: Option<PathBuf>,
    /// Command spawning a stdio bridge
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    pub settle_delay_ms: Option<u64>,
}

/// Chat section of the config file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChatSettings {
    pub max_steps: Option<usize>,
}

/// Reads the YAML configuration file
///
/// # Example
///
/// ```no_run
/// use mcp_chat_core::config::FileConfigProvider;
///
/// let file = FileConfigProvider::user().load().unwrap();
/// println!("{:?}", file.llm.model);
/// ```
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    /// Create a file config provider for a specific path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// User-level config (~/.config/mcp-chat/config.yaml)
    pub fn user() -> Self {
        // XDG config directory (~/.config on Linux, ~/Library/Application Support on macOS)
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("mcp-chat").join("config.yaml"))
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the file; a missing file yields the defaults
    pub fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }
}
