//! Configuration
//!
//! - `FileConfigProvider`: optional YAML file
//! - `ChatConfig`: the resolved settings for one session

mod error;
mod file;
mod chat;

pub use error::{ConfigError, ConfigResult};
pub use file::{ChatSettings, ConfigFile, FileConfigProvider, LlmSettings, ServerSettings};
pub use chat::{
    ChatConfig, ServerTarget, DEFAULT_API_BASE, DEFAULT_MAX_STEPS, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL, DEFAULT_STDIO_SETTLE_DELAY,
};
