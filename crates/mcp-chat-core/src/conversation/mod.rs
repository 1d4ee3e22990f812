//! Tool-calling conversation
//!
//! [`ConversationDriver::run`] answers one query with a fixed [`ReducedToolSet`]
//! (see `tools::ToolSelector`), executing remote tool calls as the model asks
//! for them until it calls the final-answer tool or runs out of things to say.
//!
//! [`ReducedToolSet`]: crate::tools::ReducedToolSet

mod driver;
mod error;
mod ordering;

pub use driver::{ConversationDriver, FRAMING_PROMPT, UNAVAILABLE_TOOL};
pub use error::ConversationError;
pub use ordering::order_blocks;
