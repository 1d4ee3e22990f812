//! Mock provider for testing
//!
//! Deterministic responses without network dependencies. Replies are served
//! from a script first; once the script runs out the fallback mode applies.
//! Every request is recorded so tests can inspect what the model was sent.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::{GenerateOptions, GenerateResponse, Provider, ProviderModelConfig};
use crate::logging::Logger;
use crate::types::{ChatMessage, ContentBlock, MessageRole};

/// Behavior once the script is exhausted
#[derive(Debug, Clone)]
enum MockMode {
    /// Echo back the last user text
    Echo,
    /// Return a fixed text response
    Fixed(String),
}

#[derive(Debug, Clone)]
enum MockReply {
    Response(GenerateResponse),
    Error(String),
}

/// A request as the mock received it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub model: ProviderModelConfig,
    pub options: GenerateOptions,
}

/// Mock LLM provider for testing
pub struct MockProvider {
    mode: MockMode,
    script: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    /// Create a new mock provider in echo mode
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Echo, logger)
    }

    fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self {
            mode,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Create a fixed response provider
    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    /// Queue a response made of the given blocks
    pub fn push_blocks(&self, blocks: Vec<ContentBlock>) -> &Self {
        self.script
            .lock()
            .push_back(MockReply::Response(GenerateResponse::from_blocks(blocks)));
        self
    }

    /// Queue a failure
    pub fn push_error(&self, message: impl Into<String>) -> &Self {
        self.script.lock().push_back(MockReply::Error(message.into()));
        self
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn last_user_text(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::User)
            .find_map(|m| match m.text() {
                Some(text) if !text.is_empty() => Some(text.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| "Hello from MockProvider!".to_string())
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: GenerateOptions,
    ) -> ProviderResult<GenerateResponse> {
        self.logger.debug(&format!(
            "MockProvider: generate called with {} messages",
            messages.len()
        ));

        let reply = self.script.lock().pop_front();
        self.requests.lock().push(RecordedRequest {
            messages: messages.clone(),
            model,
            options,
        });

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Error(message)) => Err(ProviderError::Other(format!("Mock error: {}", message))),
            None => match &self.mode {
                MockMode::Echo => {
                    let text = Self::last_user_text(&messages);
                    Ok(GenerateResponse::from_blocks(vec![ContentBlock::text(format!("Echo: {}", text))]))
                }
                MockMode::Fixed(text) => Ok(GenerateResponse::from_blocks(vec![ContentBlock::text(text.clone())])),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    fn test_config() -> ProviderModelConfig {
        ProviderModelConfig::new("mock-model")
    }

    #[tokio::test]
    async fn test_echo_mode() {
        let provider = MockProvider::new(test_logger());
        let response = provider
            .generate(vec![ChatMessage::user("Hello, world!")], test_config(), GenerateOptions::new())
            .await
            .unwrap();
        assert_eq!(response.text(), "Echo: Hello, world!");
    }

    #[tokio::test]
    async fn test_fixed_mode() {
        let provider = MockProvider::fixed("This is a test response.", test_logger());
        let response = provider
            .generate(vec![ChatMessage::user("Anything")], test_config(), GenerateOptions::new())
            .await
            .unwrap();
        assert_eq!(response.text(), "This is a test response.");
    }

    #[tokio::test]
    async fn test_script_then_fallback() {
        let provider = MockProvider::fixed("fallback", test_logger());
        provider
            .push_blocks(vec![ContentBlock::tool_use("t1", "get", json!({"key": "a"}))])
            .push_error("boom");

        let first = provider
            .generate(vec![ChatMessage::user("q")], test_config(), GenerateOptions::new())
            .await
            .unwrap();
        assert!(first.content[0].is_tool_use());

        assert!(provider
            .generate(vec![ChatMessage::user("q")], test_config(), GenerateOptions::new())
            .await
            .is_err());

        let third = provider
            .generate(vec![ChatMessage::user("q")], test_config(), GenerateOptions::new())
            .await
            .unwrap();
        assert_eq!(third.text(), "fallback");
    }

    #[tokio::test]
    async fn test_requests_are_recorded() {
        let provider = MockProvider::new(test_logger());
        provider
            .generate(
                vec![ChatMessage::user("first"), ChatMessage::user("second")],
                test_config(),
                GenerateOptions::new().with_max_tokens(42),
            )
            .await
            .unwrap();

        let requests = provider.requests();
        assert_eq!(provider.request_count(), 1);
        assert_eq!(requests[0].messages.len(), 2);
        assert_eq!(requests[0].options.max_tokens, Some(42));
        assert_eq!(requests[0].model.model, "mock-model");
        assert_eq!(provider.name(), "mock");
    }
}
