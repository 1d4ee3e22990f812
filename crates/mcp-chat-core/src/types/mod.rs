//! Core types shared by the selector, the driver and the providers

mod message;
mod tool;

pub use message::{ChatMessage, ContentBlock, MessageContent, MessageRole};
pub use tool::{
    LocalTool, ToolCall, ToolChoice, ToolDescriptor, ToolOutput, ToolResult, ToolRoute, ToolSpec,
};
