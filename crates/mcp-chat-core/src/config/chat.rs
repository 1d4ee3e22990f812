//! Resolved session configuration
//!
//! Built once at startup from the environment, the optional YAML file and the
//! secret store, then passed by reference to every component.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::providers::ProviderModelConfig;
use crate::secrets::{EnvSecretStore, SecretStore};

use super::error::{ConfigError, ConfigResult};
use super::file::{ConfigFile, FileConfigProvider};

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_MAX_STEPS: usize = 1000;
pub const DEFAULT_REDIS_HOST: &str = "host.docker.internal";
pub const DEFAULT_REDIS_PORT: &str = "6379";

/// The docker bridge needs time to come up before the first request
pub const DEFAULT_STDIO_SETTLE_DELAY: Duration = Duration::from_secs(10);

/// How to reach the tool server
#[derive(Clone, PartialEq, Eq)]
pub enum ServerTarget {
    /// Spawn a local bridge and talk MCP over its stdin/stdout
    Stdio {
        command: String,
        args: Vec<String>,
        env: Vec<(String, String)>,
    },
    /// Streamable HTTP endpoint
    Http {
        url: String,
        auth_token: Option<String>,
    },
    /// Unix domain socket
    Unix { path: PathBuf },
}

impl ServerTarget {
    /// Default bridge: the `mcp/redis` image run through docker
    pub fn redis_docker(host: &str, port: &str, username: &str, password: &str) -> Self {
        let mut args: Vec<String> = ["run", "--rm", "--name", "redis-mcp-server", "-i"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for (key, value) in [
            ("REDIS_HOST", host),
            ("REDIS_PORT", port),
            ("REDIS_USERNAME", username),
            ("REDIS_PWD", password),
        ] {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push("mcp/redis".to_string());

        ServerTarget::Stdio {
            command: "docker".to_string(),
            args,
            env: Vec::new(),
        }
    }

    /// Settling delay used when none is configured
    pub fn default_settle_delay(&self) -> Duration {
        match self {
            ServerTarget::Stdio { .. } => DEFAULT_STDIO_SETTLE_DELAY,
            ServerTarget::Http { .. } | ServerTarget::Unix { .. } => Duration::ZERO,
        }
    }
}

impl fmt::Debug for ServerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerTarget::Stdio { command, .. } => {
                // args and env may carry passwords
                f.debug_struct("Stdio").field("command", command).finish_non_exhaustive()
            }
            ServerTarget::Http { url, auth_token } => f
                .debug_struct("Http")
                .field("url", url)
                .field("auth_token", &auth_token.as_ref().map(|_| "<redacted>"))
                .finish(),
            ServerTarget::Unix { path } => f.debug_struct("Unix").field("path", path).finish(),
        }
    }
}

/// Everything a session needs, resolved up front
#[derive(Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub max_tokens: u32,
    pub max_steps: usize,
    pub server: ServerTarget,
    pub settle_delay: Duration,
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .field("max_steps", &self.max_steps)
            .field("server", &self.server)
            .field("settle_delay", &self.settle_delay)
            .finish()
    }
}

impl ChatConfig {
    /// Resolve from the process environment and the YAML file
    pub fn from_env() -> ConfigResult<Self> {
        let provider = match env::var("MCP_CHAT_CONFIG") {
            Ok(path) if !path.is_empty() => FileConfigProvider::new(path),
            _ => FileConfigProvider::user(),
        };
        let file = provider.load()?;
        Self::resolve(
            file,
            |key| env::var(key).ok().filter(|v| !v.is_empty()),
            &EnvSecretStore::new(),
        )
    }

    /// Resolve from explicit sources.
    ///
    /// Precedence: environment variable, then config file, then default.
    /// The API key comes from the secret store only.
    pub fn resolve<F>(file: ConfigFile, vars: F, secrets: &dyn SecretStore) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = secrets
            .get("anthropic")
            .ok_or_else(|| ConfigError::missing_credential("ANTHROPIC_API_KEY"))?;

        let model = vars("ANTHROPIC_MODEL")
            .or(file.llm.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = vars("ANTHROPIC_BASE_URL")
            .or(file.llm.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let max_tokens = file.llm.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(ConfigError::invalid("llm.max_tokens", "must be greater than zero"));
        }
        let max_steps = file.chat.max_steps.unwrap_or(DEFAULT_MAX_STEPS);
        if max_steps == 0 {
            return Err(ConfigError::invalid("chat.max_steps", "must be greater than zero"));
        }

        let server = if let Some(url) = vars("MCP_SERVER_URL") {
            ServerTarget::Http {
                url,
                auth_token: secrets.get("mcp"),
            }
        } else if let Some(path) = vars("MCP_SERVER_SOCKET") {
            ServerTarget::Unix { path: PathBuf::from(path) }
        } else if let Some(url) = file.server.url.clone() {
            ServerTarget::Http {
                url,
                auth_token: secrets.get("mcp"),
            }
        } else if let Some(path) = file.server.socket.clone() {
            ServerTarget::Unix { path }
        } else if let Some(command) = file.server.command.clone() {
            ServerTarget::Stdio {
                command,
                args: file.server.args.clone(),
                env: file.server.env.clone().into_iter().collect(),
            }
        } else {
            ServerTarget::redis_docker(
                &vars("REDIS_HOST").unwrap_or_else(|| DEFAULT_REDIS_HOST.to_string()),
                &vars("REDIS_PORT").unwrap_or_else(|| DEFAULT_REDIS_PORT.to_string()),
                &vars("REDIS_USERNAME").unwrap_or_default(),
                &secrets.get("redis").unwrap_or_default(),
            )
        };

        let settle_delay = match vars("MCP_SETTLE_DELAY_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| ConfigError::invalid("MCP_SETTLE_DELAY_MS", e.to_string()))?,
            None => file
                .server
                .settle_delay_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| server.default_settle_delay()),
        };

        Ok(Self {
            api_key,
            model,
            api_base,
            max_tokens,
            max_steps,
            server,
            settle_delay,
        })
    }

    /// Model settings handed to the provider on every request
    pub fn model_config(&self) -> ProviderModelConfig {
        ProviderModelConfig::new(&self.model)
            .with_api_key(&self.api_key)
            .with_api_base(&self.api_base)
    }
}
