//! Tool selection
//!
//! One constrained LLM round-trip that narrows the catalog down to the tools
//! relevant for a query. The model answers through the `inform-tool` meta-tool;
//! whatever it names is mapped back through the catalog.

use std::sync::Arc;

use serde_json::Value;

use super::catalog::{ReducedToolSet, ToolCatalog, ToolFilter};
use crate::logging::Logger;
use crate::providers::{GenerateOptions, Provider, ProviderModelConfig};
use crate::types::{ChatMessage, ContentBlock, LocalTool, ToolChoice};
use crate::{log_debug, log_info, log_warn};

/// Picks the catalog subset offered to the conversation loop
pub struct ToolSelector {
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    max_tokens: u32,
    logger: Arc<dyn Logger>,
}

impl ToolSelector {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: ProviderModelConfig,
        max_tokens: u32,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider,
            model,
            max_tokens,
            logger,
        }
    }

    /// The selection request sent to the model
    pub fn prompt(query: &str, catalog: &ToolCatalog) -> String {
        format!(
            "Given the following query, which tools should I use?\n\
             Query: {}\n\
             Available tools: {}\n\
             Use the '{}' tool to tell me which tools make sense to use. \
             Send only the names of the tools that are relevant to the query.",
            query,
            catalog.describe(),
            LocalTool::SELECTOR_NAME
        )
    }

    /// Ask the model which tools fit `query`.
    ///
    /// Never fails: any problem with the model or its answer yields an empty
    /// remote set, leaving only the final-answer tool.
    pub async fn select(&self, query: &str, catalog: &ToolCatalog) -> ReducedToolSet {
        let messages = vec![ChatMessage::user(Self::prompt(query, catalog))];
        let options = GenerateOptions::new()
            .with_max_tokens(self.max_tokens)
            .with_tools(vec![LocalTool::Selector.spec()])
            .with_tool_choice(ToolChoice::Tool {
                name: LocalTool::SELECTOR_NAME.to_string(),
            });

        let response = match self.provider.generate(messages, self.model.clone(), options).await {
            Ok(response) => response,
            Err(e) => {
                log_warn!(self.logger, "[ToolSelector] Selection failed, continuing without tools: {}", e);
                return ReducedToolSet::empty();
            }
        };

        let Some(names) = parse_selection(&response.content) else {
            log_warn!(self.logger, "[ToolSelector] No usable '{}' call in response", LocalTool::SELECTOR_NAME);
            return ReducedToolSet::empty();
        };
        log_debug!(self.logger, "[ToolSelector] Model named: {:?}", names);

        let selected = catalog.filter(&ToolFilter::new().with_include(names));
        log_info!(
            self.logger,
            "[ToolSelector] Selected {} of {} tools: {:?}",
            selected.len(),
            catalog.len(),
            selected.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
        );
        ReducedToolSet::new(selected)
    }
}

/// Names carried by the last `inform-tool` call, if it is well formed
fn parse_selection(blocks: &[ContentBlock]) -> Option<Vec<String>> {
    let input = blocks.iter().rev().find_map(|block| match block {
        ContentBlock::ToolUse { name, input, .. } if name == LocalTool::SELECTOR_NAME => Some(input),
        _ => None,
    })?;

    let entries = input.get(LocalTool::SELECTOR_ARG)?.as_array()?;
    Some(
        entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}
