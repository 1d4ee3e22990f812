//! Tool management module
//!
//! Tool discovery, per-query selection and execution for LLM tool calling.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ToolSelector                               │
//! │    - one forced `inform-tool` LLM call      │
//! │    - catalog ──▶ ReducedToolSet             │
//! └─────────────────────────────────────────────┘
//!           │
//!           ▼
//! ┌─────────────────────────────────────────────┐
//! │  ToolRegistry                               │
//! │    - caches the ToolCatalog                 │
//! │    - executes remote tool calls             │
//! └─────────────────────────────────────────────┘
//!           │
//!           │ ToolBackend (tools/list, tools/call)
//!           ▼
//! ┌─────────────────────────────────────────────┐
//! │  McpClient ──▶ MCP server                   │
//! │    stdio bridge | Streamable HTTP | socket  │
//! └─────────────────────────────────────────────┘
//! ```

mod backend;
mod catalog;
mod registry;
mod selector;
mod mock;

pub use backend::ToolBackend;
pub use catalog::{ReducedToolSet, ToolCatalog, ToolFilter};
pub use registry::ToolRegistry;
pub use selector::ToolSelector;
pub use mock::MockToolBackend;
