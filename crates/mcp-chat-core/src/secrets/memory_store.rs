//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::SecretStore;

/// In-memory secret store for tests
///
/// # Example
///
/// ```
/// use mcp_chat_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.insert("anthropic", "sk-ant-test");
/// assert_eq!(store.get("anthropic"), Some("sk-ant-test".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store with initial values
    pub fn with_secrets<K, V>(initial: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            secrets: RwLock::new(initial.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Add or replace a secret
    pub fn insert(&self, key: &str, value: &str) {
        self.secrets.write().insert(key.to_string(), value.to_string());
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.secrets.read().get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemorySecretStore::with_secrets([("anthropic", "sk-1")]);
        assert_eq!(store.name(), "memory");
        assert!(store.has("anthropic"));
        assert!(!store.has("redis"));

        store.insert("anthropic", "sk-2");
        assert_eq!(store.get("anthropic"), Some("sk-2".to_string()));
    }
}
