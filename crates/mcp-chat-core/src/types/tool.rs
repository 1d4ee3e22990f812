//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::message::ContentBlock;

/// A tool exposed by the remote tool server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name, unique within a catalog
    pub name: String,
    /// Description of what the tool does (may span several lines)
    #[serde(default)]
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Create a new tool descriptor with an empty object schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    /// First non-blank line of the description
    pub fn summary(&self) -> &str {
        self.description
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }
}

/// Tool definition as offered to the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name (function name)
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    pub input_schema: Value,
}

impl From<&ToolDescriptor> for ToolSpec {
    fn from(tool: &ToolDescriptor) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
        }
    }
}

/// Tools defined by this client and used purely as structured-output channels.
///
/// They are offered to the LLM but never forwarded to the tool server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalTool {
    /// Lets the LLM name the catalog tools relevant to a query
    Selector,
    /// Lets the LLM signal that it is done, carrying the answer text
    FinalAnswer,
}

impl LocalTool {
    pub const SELECTOR_NAME: &'static str = "inform-tool";
    pub const FINAL_ANSWER_NAME: &'static str = "final-tool";

    /// Argument of the selector carrying the tool names
    pub const SELECTOR_ARG: &'static str = "tools";
    /// Argument of the final-answer tool carrying the answer
    pub const FINAL_ANSWER_ARG: &'static str = "final_response";

    /// Wire name of the tool
    pub fn name(&self) -> &'static str {
        match self {
            LocalTool::Selector => Self::SELECTOR_NAME,
            LocalTool::FinalAnswer => Self::FINAL_ANSWER_NAME,
        }
    }

    /// Identify a local tool by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            Self::SELECTOR_NAME => Some(LocalTool::Selector),
            Self::FINAL_ANSWER_NAME => Some(LocalTool::FinalAnswer),
            _ => None,
        }
    }

    /// Tool definition to offer to the LLM
    pub fn spec(&self) -> ToolSpec {
        match self {
            LocalTool::Selector => ToolSpec {
                name: self.name().to_string(),
                description: "Given an existing set of tools, this tool you tell me which tools make sense to use for a given prompt.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "tools": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "List of tool names that are relevant to the query."
                        }
                    },
                    "required": ["tools"]
                }),
            },
            LocalTool::FinalAnswer => ToolSpec {
                name: self.name().to_string(),
                description: "This tool is used to finalize the response after all tools have been executed.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "final_response": {
                            "type": "string",
                            "description": "The final response after executing all relevant tools."
                        }
                    },
                    "required": ["final_response"]
                }),
            },
        }
    }
}

/// Where a tool call named by the LLM has to go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRoute {
    /// Forward to the tool server
    Remote,
    /// Handled inside the client
    Local(LocalTool),
}

impl ToolRoute {
    /// Classify a tool name
    pub fn of(name: &str) -> Self {
        match LocalTool::from_name(name) {
            Some(local) => ToolRoute::Local(local),
            None => ToolRoute::Remote,
        }
    }
}

/// Tool call from the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Input arguments for the tool
    pub input: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Get an input argument as a string
    pub fn get_arg_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(|v| v.as_str())
    }
}

/// Output of a tool server invocation, before correlation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Rendered content returned by the server
    pub content: String,
    /// Whether the server flagged the result as an error
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }
}

/// Tool result to send back to LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is responding to
    #[serde(rename = "callId")]
    pub call_id: String,
    /// The result content
    pub content: String,
    /// Whether this result represents an error
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: error.into(),
            is_error: true,
        }
    }

    /// Correlate a server output with the call that produced it
    pub fn from_output(call_id: impl Into<String>, output: ToolOutput) -> Self {
        Self {
            call_id: call_id.into(),
            content: output.content,
            is_error: output.is_error,
        }
    }

    /// Content block to append to the conversation
    pub fn into_block(self) -> ContentBlock {
        ContentBlock::ToolResult {
            tool_use_id: self.call_id,
            content: self.content,
            is_error: self.is_error,
        }
    }
}

/// Tool choice for requests. Leaving it unset lets the model decide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolChoice {
    /// Force a specific tool
    Tool { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_is_first_non_blank_line() {
        let tool = ToolDescriptor::new("get", "\n   \n  Get a key.\nReturns the value.");
        assert_eq!(tool.summary(), "Get a key.");

        let crlf = ToolDescriptor::new("set", "Set a key.\r\nMore text");
        assert_eq!(crlf.summary(), "Set a key.");

        assert_eq!(ToolDescriptor::new("empty", "").summary(), "");
    }

    #[test]
    fn test_local_tool_names_round_trip() {
        for tool in [LocalTool::Selector, LocalTool::FinalAnswer] {
            assert_eq!(LocalTool::from_name(tool.name()), Some(tool));
            assert_eq!(tool.spec().name, tool.name());
        }
        assert_eq!(LocalTool::from_name("get"), None);
    }

    #[test]
    fn test_tool_route() {
        assert_eq!(ToolRoute::of("final-tool"), ToolRoute::Local(LocalTool::FinalAnswer));
        assert_eq!(ToolRoute::of("inform-tool"), ToolRoute::Local(LocalTool::Selector));
        assert_eq!(ToolRoute::of("hset"), ToolRoute::Remote);
    }

    #[test]
    fn test_local_tool_schemas() {
        let selector = LocalTool::Selector.spec();
        assert_eq!(selector.input_schema["properties"]["tools"]["type"], "array");
        assert_eq!(selector.input_schema["properties"]["tools"]["items"]["type"], "string");

        let final_answer = LocalTool::FinalAnswer.spec();
        assert_eq!(final_answer.input_schema["properties"]["final_response"]["type"], "string");
    }

    #[test]
    fn test_tool_result() {
        let success = ToolResult::success("call_123", "OK");
        assert!(!success.is_error);

        let error = ToolResult::error("call_456", "key not found");
        assert!(error.is_error);

        let from_output = ToolResult::from_output("call_789", ToolOutput { content: "boom".into(), is_error: true });
        assert_eq!(
            from_output.into_block(),
            ContentBlock::ToolResult { tool_use_id: "call_789".into(), content: "boom".into(), is_error: true }
        );
    }

    #[test]
    fn test_tool_choice_wire_format() {
        assert_eq!(
            serde_json::to_value(ToolChoice::Tool { name: "inform-tool".into() }).unwrap(),
            json!({"type": "tool", "name": "inform-tool"})
        );
    }
}
