//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::SecretStore;

/// Mapping from service names to environment variable names
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("anthropic", vec!["ANTHROPIC_API_KEY"]);
    m.insert("redis", vec!["REDIS_PWD", "REDIS_PASSWORD"]);
    m.insert("mcp", vec!["MCP_SERVER_TOKEN"]);
    m
});

/// Secret store that reads from environment variables
///
/// This store is read-only. Values in `.env` files are visible once the
/// binary has loaded them with dotenvy. Empty variables count as unset.
///
/// # Service Mapping
///
/// - `anthropic` → `ANTHROPIC_API_KEY`
/// - `redis` → `REDIS_PWD` or `REDIS_PASSWORD`
/// - `mcp` → `MCP_SERVER_TOKEN`
///
/// Any other key is looked up as-is, then as `<KEY>_API_KEY`.
#[derive(Debug, Default)]
pub struct EnvSecretStore {
    _private: (),
}

impl EnvSecretStore {
    /// Create a new environment variable secret store
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Get the environment variable names for a service
    pub fn get_env_vars_for(service: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP.get(service.to_lowercase().as_str()).map(|v| v.as_slice())
    }

    fn non_empty(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = Self::non_empty(key) {
            return Some(value);
        }

        if let Some(env_vars) = Self::get_env_vars_for(key) {
            if let Some(value) = env_vars.iter().find_map(|var| Self::non_empty(var)) {
                return Some(value);
            }
        }

        Self::non_empty(&format!("{}_API_KEY", key.to_uppercase()))
    }
}
