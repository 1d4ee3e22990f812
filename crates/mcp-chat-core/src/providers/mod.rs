//! LLM Provider implementations
//!
//! - `AnthropicProvider`: Anthropic Messages API over reqwest
//! - `MockProvider`: scripted responses for tests
//!
//! Providers return a whole turn at a time. The conversation driver needs the
//! content blocks in the exact order the model emitted them.

mod traits;
mod error;
mod anthropic;
mod mock;

// Core traits and types
pub use traits::{GenerateOptions, GenerateResponse, Provider, ProviderModelConfig, Usage};
pub use error::{ProviderError, ProviderResult};

pub use anthropic::{AnthropicProvider, ANTHROPIC_API_BASE, ANTHROPIC_VERSION};

// Mock provider for testing
pub use mock::{MockProvider, RecordedRequest};
