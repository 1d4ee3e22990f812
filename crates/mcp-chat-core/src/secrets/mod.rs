//! Secret lookup abstractions
//!
//! - `SecretStore` trait for read-only lookups
//! - `EnvSecretStore` for the process environment
//! - `MemorySecretStore` for tests

mod traits;
mod env_store;
mod memory_store;

pub use traits::SecretStore;
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
