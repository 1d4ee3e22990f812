//! Anthropic Messages API provider
//!
//! Non-streaming `POST /v1/messages`. Content blocks come back in the order
//! the model produced them, which the conversation driver depends on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::{GenerateOptions, GenerateResponse, Provider, ProviderModelConfig, Usage};
use crate::logging::Logger;
use crate::types::{ChatMessage, ContentBlock, ToolChoice, ToolSpec};
use crate::{log_debug, log_warn};

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Used when the caller sets no `max_tokens`; the API requires one
const FALLBACK_MAX_TOKENS: u32 = 1000;

const PROVIDER: &str = "anthropic";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a ToolChoice>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Provider talking to the Anthropic Messages API
pub struct AnthropicProvider {
    client: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl AnthropicProvider {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_client(reqwest::Client::new(), logger)
    }

    /// Use a preconfigured HTTP client (proxies, timeouts)
    pub fn with_client(client: reqwest::Client, logger: Arc<dyn Logger>) -> Self {
        Self { client, logger }
    }

    fn endpoint(model: &ProviderModelConfig) -> String {
        let base = model.api_base.as_deref().unwrap_or(ANTHROPIC_API_BASE);
        format!("{}/v1/messages", base.trim_end_matches('/'))
    }

    /// Map a non-2xx response to a provider error, preferring the API's own message
    async fn ensure_success(&self, response: reqwest::Response) -> ProviderResult<reqwest::Response> {
        let status = response.status();
        log_debug!(self.logger, "Anthropic HTTP status: {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(body);

        log_warn!(self.logger, "Anthropic request failed ({}): {}", status, message);
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::rate_limited(PROVIDER, message));
        }
        Err(ProviderError::api_error(PROVIDER, status.as_u16(), message))
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: GenerateOptions,
    ) -> ProviderResult<GenerateResponse> {
        let api_key = model
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::missing_api_key(PROVIDER))?;

        let body = MessagesRequest {
            model: &model.model,
            max_tokens: options.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            messages: &messages,
            tools: (!options.tools.is_empty()).then_some(options.tools.as_slice()),
            tool_choice: options.tool_choice.as_ref(),
        };

        log_debug!(
            self.logger,
            "Anthropic request: model={}, messages={}, tools={}",
            model.model,
            messages.len(),
            options.tools.len()
        );

        let response = self
            .client
            .post(Self::endpoint(&model))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;
        let response = self.ensure_success(response).await?;

        let text = response.text().await?;
        let parsed: MessagesResponse = serde_json::from_str(&text).map_err(|e| {
            ProviderError::invalid_response(PROVIDER, format!("failed to decode response: {}", e))
        })?;

        log_debug!(
            self.logger,
            "Anthropic response: blocks={}, stop_reason={:?}, usage={}/{}",
            parsed.content.len(),
            parsed.stop_reason,
            parsed.usage.input_tokens,
            parsed.usage.output_tokens
        );

        Ok(GenerateResponse {
            content: parsed.content,
            stop_reason: parsed.stop_reason,
            usage: parsed.usage,
        })
    }
}
