//! Tool-calling conversation loop
//!
//! A FIFO of pending content blocks, seeded by the first model response.
//! Text is collected, remote tool calls are executed and answered, and each
//! answer triggers a follow-up model call whose blocks join the back of the
//! queue. A call to the final-answer tool ends the loop at once.

use std::collections::VecDeque;
use std::sync::Arc;

use super::error::ConversationError;
use super::ordering::order_blocks;
use crate::logging::Logger;
use crate::providers::{GenerateOptions, GenerateResponse, Provider, ProviderModelConfig};
use crate::tools::{ReducedToolSet, ToolRegistry};
use crate::types::{ChatMessage, ContentBlock, LocalTool, ToolCall, ToolResult, ToolRoute, ToolSpec};
use crate::{log_debug, log_info, log_warn};

/// Framing message sent ahead of every query
pub const FRAMING_PROMPT: &str = "You are a helpful assistant. Use the tools provided to answer the query. \
Once you're done call the 'final-tool' to indicate that you have made all the necessary tool calls.";

/// Content of the error result returned for tools the loop does not offer
pub const UNAVAILABLE_TOOL: &str = "tool is not available";

/// Runs one query against a fixed tool set
pub struct ConversationDriver {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    model: ProviderModelConfig,
    max_tokens: u32,
    max_steps: usize,
    logger: Arc<dyn Logger>,
}

impl ConversationDriver {
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: Arc<ToolRegistry>,
        model: ProviderModelConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider,
            registry,
            model,
            max_tokens: crate::config::DEFAULT_MAX_TOKENS,
            max_steps: crate::config::DEFAULT_MAX_STEPS,
            logger,
        }
    }

    /// Token budget for every model call
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Upper bound on model round-trips per query
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Answer `query` using only the tools in `tool_set`.
    ///
    /// Returns every text fragment produced along the way, joined by newlines.
    pub async fn run(&self, query: &str, tool_set: &ReducedToolSet) -> Result<String, ConversationError> {
        let tools = tool_set.tool_specs();
        let mut history = vec![ChatMessage::user(FRAMING_PROMPT), ChatMessage::user(query)];
        let mut output: Vec<String> = Vec::new();

        let first = self.generate(&history, &tools).await?;
        let mut steps = 1;
        let mut pending: VecDeque<ContentBlock> = order_blocks(first.content).into();

        while let Some(block) = pending.pop_front() {
            let call = match block {
                ContentBlock::Text { text } => {
                    log_info!(self.logger, "[Conversation] Text: {}", text);
                    output.push(text.clone());
                    // the API rejects empty text content
                    if !text.is_empty() {
                        history.push(ChatMessage::assistant(text));
                    }
                    continue;
                }
                ContentBlock::ToolUse { id, name, input } => ToolCall::new(id, name, input),
                ContentBlock::ToolResult { .. } | ContentBlock::Unknown => {
                    log_debug!(self.logger, "[Conversation] Skipping non-actionable block");
                    continue;
                }
            };

            let result = match tool_set.route(&call.name) {
                ToolRoute::Local(LocalTool::FinalAnswer) => {
                    match call.get_arg_str(LocalTool::FINAL_ANSWER_ARG) {
                        Some(answer) => {
                            log_info!(self.logger, "[Conversation] Final answer received");
                            output.push(answer.to_string());
                        }
                        None => log_warn!(
                            self.logger,
                            "[Conversation] '{}' called without a string '{}'",
                            LocalTool::FINAL_ANSWER_NAME,
                            LocalTool::FINAL_ANSWER_ARG
                        ),
                    }
                    break;
                }
                ToolRoute::Local(LocalTool::Selector) => {
                    log_warn!(self.logger, "[Conversation] '{}' is not offered here", call.name);
                    history.push(ChatMessage::tool_use(&call));
                    ToolResult::error(call.id.clone(), UNAVAILABLE_TOOL)
                }
                ToolRoute::Remote => {
                    log_info!(self.logger, "[Conversation] Tool call: {} {}", call.name, call.input);
                    history.push(ChatMessage::tool_use(&call));
                    let result = self.registry.execute_tool_call(&call).await?;
                    log_info!(
                        self.logger,
                        "[Conversation] Tool result for {}{}",
                        call.name,
                        if result.is_error { " (error)" } else { "" }
                    );
                    result
                }
            };
            history.push(ChatMessage::tool_result(result));

            if steps >= self.max_steps {
                log_warn!(
                    self.logger,
                    "[Conversation] Reached {} model calls, returning what we have",
                    self.max_steps
                );
                break;
            }

            let next = self.generate(&history, &tools).await?;
            steps += 1;
            pending.extend(order_blocks(next.content));
        }

        Ok(output.join("\n"))
    }

    async fn generate(
        &self,
        history: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<GenerateResponse, ConversationError> {
        let options = GenerateOptions::new()
            .with_max_tokens(self.max_tokens)
            .with_tools(tools.to_vec());
        let response = self
            .provider
            .generate(history.to_vec(), self.model.clone(), options)
            .await?;
        log_debug!(
            self.logger,
            "[Conversation] Model returned {} blocks (stop_reason={:?})",
            response.content.len(),
            response.stop_reason
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::providers::MockProvider;
    use crate::tools::{MockToolBackend, ToolCatalog, ToolFilter};
    use crate::types::{MessageRole, ToolDescriptor, ToolOutput};
    use serde_json::json;

    struct Fixture {
        provider: Arc<MockProvider>,
        backend: Arc<MockToolBackend>,
        driver: ConversationDriver,
    }

    fn fixture() -> Fixture {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger::new());
        let provider = Arc::new(MockProvider::new(logger.clone()));
        let backend = Arc::new(MockToolBackend::new(catalog().iter().cloned().collect()));
        let registry = Arc::new(ToolRegistry::new(backend.clone(), logger.clone()));
        let driver = ConversationDriver::new(provider.clone(), registry, ProviderModelConfig::new("mock"), logger);
        Fixture { provider, backend, driver }
    }

    fn catalog() -> ToolCatalog {
        [
            ToolDescriptor::new("get", "Get the value of a key."),
            ToolDescriptor::new("set", "Set a key to a value."),
        ]
        .into_iter()
        .collect()
    }

    fn only(names: &[&str]) -> ReducedToolSet {
        ReducedToolSet::new(catalog().filter(&ToolFilter::new().with_include(names.iter().copied())))
    }

    fn final_answer(id: &str, answer: &str) -> ContentBlock {
        ContentBlock::tool_use(id, "final-tool", json!({ "final_response": answer }))
    }

    /// Every tool_use in history is answered by the next message, with the same id
    fn assert_paired(history: &[ChatMessage]) {
        for (i, message) in history.iter().enumerate() {
            for block in message.blocks() {
                if let ContentBlock::ToolUse { id, .. } = block {
                    let next = history.get(i + 1).expect("tool_use must be answered");
                    assert_eq!(next.role, MessageRole::User);
                    assert!(matches!(
                        next.blocks(),
                        [ContentBlock::ToolResult { tool_use_id, .. }] if tool_use_id == id
                    ));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_set_key_scenario() {
        let f = fixture();
        f.backend.respond("set", ToolOutput::text("OK"));
        f.provider
            .push_blocks(vec![ContentBlock::tool_use("toolu_1", "set", json!({"key": "key", "value": "5"}))])
            .push_blocks(vec![final_answer("toolu_2", "Done")]);

        let answer = f.driver.run("set key=5", &only(&["set"])).await.unwrap();
        assert_eq!(answer, "Done");

        assert_eq!(f.backend.calls(), vec![("set".to_string(), json!({"key": "key", "value": "5"}))]);

        let requests = f.provider.requests();
        assert_eq!(requests.len(), 2);
        let first = &requests[0];
        assert_eq!(first.messages[0], ChatMessage::user(FRAMING_PROMPT));
        assert_eq!(first.messages[1], ChatMessage::user("set key=5"));
        let tool_names: Vec<_> = first.options.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tool_names, vec!["set", "final-tool"]);
        assert_eq!(first.options.tool_choice, None);

        let follow_up = &requests[1].messages;
        assert_eq!(follow_up.len(), 4);
        assert_eq!(
            follow_up[3].blocks(),
            &[ContentBlock::ToolResult { tool_use_id: "toolu_1".into(), content: "OK".into(), is_error: false }]
        );
        assert_paired(follow_up);
        assert_eq!(requests[1].options.tools, first.options.tools);
    }

    #[tokio::test]
    async fn test_text_only_response_ends_when_queue_drains() {
        let f = fixture();
        f.provider.push_blocks(vec![ContentBlock::text("Hello"), ContentBlock::text("there")]);

        let answer = f.driver.run("hi", &ReducedToolSet::empty()).await.unwrap();
        assert_eq!(answer, "Hello\nthere");
        assert_eq!(f.provider.request_count(), 1);
        assert_eq!(f.backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_selection_still_answers() {
        let f = fixture();
        f.provider
            .push_blocks(vec![ContentBlock::text("No tools needed."), final_answer("f", "42")]);

        let answer = f.driver.run("what is 6*7", &ReducedToolSet::empty()).await.unwrap();
        assert_eq!(answer, "No tools needed.\n42");

        let tools = &f.provider.requests()[0].options.tools;
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "final-tool");
    }

    #[tokio::test]
    async fn test_tool_then_text_is_reordered() {
        let f = fixture();
        f.provider
            .push_blocks(vec![
                ContentBlock::tool_use("toolu_1", "get", json!({"key": "a"})),
                ContentBlock::text("Looking it up."),
            ])
            .push_blocks(vec![ContentBlock::text("It is 1."), final_answer("f", "a=1")]);

        let answer = f.driver.run("get a", &only(&["get"])).await.unwrap();
        assert_eq!(answer, "Looking it up.\nIt is 1.\na=1");

        // the text was appended to history before the tool call
        let follow_up = &f.provider.requests()[1].messages;
        assert_eq!(follow_up[2], ChatMessage::assistant("Looking it up."));
        assert!(follow_up[3].blocks()[0].is_tool_use());
    }

    #[tokio::test]
    async fn test_final_answer_stops_with_pending_blocks() {
        let f = fixture();
        f.provider.push_blocks(vec![
            final_answer("f", "done early"),
            ContentBlock::tool_use("toolu_1", "set", json!({"key": "k", "value": "v"})),
            ContentBlock::text("never printed"),
        ]);

        let answer = f.driver.run("q", &only(&["set"])).await.unwrap();
        assert_eq!(answer, "done early");
        assert_eq!(f.backend.call_count(), 0);
        assert_eq!(f.provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_final_answer_without_argument() {
        let f = fixture();
        f.provider
            .push_blocks(vec![ContentBlock::text("Partial"), ContentBlock::tool_use("f", "final-tool", json!({}))]);

        let answer = f.driver.run("q", &ReducedToolSet::empty()).await.unwrap();
        assert_eq!(answer, "Partial");
    }

    #[tokio::test]
    async fn test_empty_text_stays_out_of_history() {
        let f = fixture();
        f.backend.respond("get", ToolOutput::text("5"));
        f.provider
            .push_blocks(vec![
                ContentBlock::text(""),
                ContentBlock::tool_use("t1", "get", json!({"key": "a"})),
            ])
            .push_blocks(vec![final_answer("t2", "It is 5")]);

        let answer = f.driver.run("get a", &only(&["get"])).await.unwrap();
        assert_eq!(answer, "\nIt is 5");

        let follow_up = &f.provider.requests()[1].messages;
        assert_eq!(follow_up.len(), 4);
        assert!(follow_up.iter().all(|m| m.text() != Some("")));
        assert_paired(follow_up);
    }

    #[tokio::test]
    async fn test_follow_up_blocks_queue_behind_pending() {
        let f = fixture();
        f.provider
            .push_blocks(vec![
                ContentBlock::tool_use("t1", "get", json!({"key": "a"})),
                ContentBlock::tool_use("t2", "get", json!({"key": "b"})),
                ContentBlock::text("first batch"),
            ])
            .push_blocks(vec![ContentBlock::text("after a")])
            .push_blocks(vec![ContentBlock::text("after b")]);

        let answer = f.driver.run("get a and b", &only(&["get"])).await.unwrap();
        assert_eq!(answer, "first batch\nafter a\nafter b");
        assert_eq!(f.backend.call_count(), 2);

        let requests = f.provider.requests();
        assert_eq!(requests.len(), 3);
        for request in &requests {
            assert_paired(&request.messages);
        }
    }

    #[tokio::test]
    async fn test_remote_error_propagates() {
        let f = fixture();
        f.backend.fail_call("set", "invalid arguments");
        f.provider
            .push_blocks(vec![ContentBlock::tool_use("toolu_1", "set", json!({}))])
            .push_blocks(vec![final_answer("f", "unreachable")]);

        let err = f.driver.run("set", &only(&["set"])).await.unwrap_err();
        assert!(matches!(err, ConversationError::Tool(_)));
        assert_eq!(f.provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_tool_reported_error_is_fed_back() {
        let f = fixture();
        f.backend.respond("get", ToolOutput { content: "no such key".into(), is_error: true });
        f.provider
            .push_blocks(vec![ContentBlock::tool_use("toolu_1", "get", json!({"key": "zz"}))])
            .push_blocks(vec![final_answer("f", "Key zz does not exist.")]);

        let answer = f.driver.run("get zz", &only(&["get"])).await.unwrap();
        assert_eq!(answer, "Key zz does not exist.");
        let follow_up = &f.provider.requests()[1].messages;
        assert!(matches!(follow_up[3].blocks(), [ContentBlock::ToolResult { is_error: true, .. }]));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let f = fixture();
        f.provider.push_error("overloaded");
        let err = f.driver.run("q", &ReducedToolSet::empty()).await.unwrap_err();
        assert!(matches!(err, ConversationError::Provider(_)));
    }

    #[tokio::test]
    async fn test_local_tools_never_reach_the_server() {
        let f = fixture();
        f.provider
            .push_blocks(vec![ContentBlock::tool_use("s1", "inform-tool", json!({"tools": ["get"]}))])
            .push_blocks(vec![final_answer("f", "ok")]);

        let answer = f.driver.run("q", &only(&["get"])).await.unwrap();
        assert_eq!(answer, "ok");
        assert_eq!(f.backend.call_count(), 0);

        let follow_up = &f.provider.requests()[1].messages;
        assert_paired(follow_up);
        assert_eq!(
            follow_up[3].blocks(),
            &[ContentBlock::ToolResult { tool_use_id: "s1".into(), content: UNAVAILABLE_TOOL.into(), is_error: true }]
        );
    }

    #[tokio::test]
    async fn test_skips_unknown_and_tool_result_blocks() {
        let f = fixture();
        f.provider.push_blocks(vec![
            ContentBlock::Unknown,
            ContentBlock::ToolResult { tool_use_id: "x".into(), content: "stray".into(), is_error: false },
            ContentBlock::text("hi"),
        ]);
        assert_eq!(f.driver.run("q", &ReducedToolSet::empty()).await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_step_cap_returns_accumulated_text() {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger::new());
        let provider = Arc::new(MockProvider::new(logger.clone()));
        let backend = Arc::new(MockToolBackend::new(catalog().iter().cloned().collect()));
        let registry = Arc::new(ToolRegistry::new(backend.clone(), logger.clone()));
        let driver = ConversationDriver::new(provider.clone(), registry, ProviderModelConfig::new("mock"), logger)
            .with_max_steps(3);

        for i in 0..5 {
            provider.push_blocks(vec![
                ContentBlock::text(format!("step {}", i)),
                ContentBlock::tool_use(format!("t{}", i), "get", json!({"key": "a"})),
            ]);
        }

        let answer = driver.run("loop forever", &only(&["get"])).await.unwrap();
        assert_eq!(answer, "step 0\nstep 1\nstep 2");
        assert_eq!(provider.request_count(), 3);
        assert_eq!(backend.call_count(), 3);
    }
}
