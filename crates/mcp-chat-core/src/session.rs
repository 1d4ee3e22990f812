//! Session lifecycle
//!
//! One tool-server connection, one catalog, many queries. `start` connects and
//! fetches the catalog; `process_query` runs selection then the conversation
//! loop; `shutdown` releases the connection exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::config::{ChatConfig, ConfigError};
use crate::conversation::{ConversationDriver, ConversationError};
use crate::logging::Logger;
use crate::mcp::{McpClient, McpError};
use crate::providers::Provider;
use crate::tools::{ToolBackend, ToolCatalog, ToolRegistry, ToolSelector};
use crate::{log_debug, log_info, log_warn};

/// Session-level failures
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tool server unreachable or misbehaving
    #[error("Tool server error: {0}")]
    Connection(#[from] McpError),

    /// A query failed; the session itself is still usable
    #[error("{0}")]
    Conversation(#[from] ConversationError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// An interactive chat session against one tool server
pub struct Session {
    config: ChatConfig,
    registry: Arc<ToolRegistry>,
    selector: ToolSelector,
    driver: ConversationDriver,
    closed: AtomicBool,
    logger: Arc<dyn Logger>,
}

impl Session {
    /// Assemble a session over an existing backend. Call `initialize` before use.
    pub fn new(
        provider: Arc<dyn Provider>,
        backend: Arc<dyn ToolBackend>,
        config: ChatConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let registry = Arc::new(ToolRegistry::new(backend, logger.clone()));
        let selector = ToolSelector::new(
            provider.clone(),
            config.model_config(),
            config.max_tokens,
            logger.clone(),
        );
        let driver = ConversationDriver::new(provider, registry.clone(), config.model_config(), logger.clone())
            .with_max_tokens(config.max_tokens)
            .with_max_steps(config.max_steps);

        Self {
            config,
            registry,
            selector,
            driver,
            closed: AtomicBool::new(false),
            logger,
        }
    }

    /// Connect to the configured tool server, let it settle, fetch the catalog
    pub async fn start(
        config: ChatConfig,
        provider: Arc<dyn Provider>,
        logger: Arc<dyn Logger>,
    ) -> SessionResult<Self> {
        let session = Self::connect(config, provider, logger).await?;
        if let Err(e) = session.settle_and_initialize().await {
            session.shutdown().await;
            return Err(e);
        }
        Ok(session)
    }

    /// Connect to the configured tool server without fetching the catalog.
    ///
    /// Follow with `settle_and_initialize`. The connection is open from here
    /// on, so callers must `shutdown` whatever happens next.
    pub async fn connect(
        config: ChatConfig,
        provider: Arc<dyn Provider>,
        logger: Arc<dyn Logger>,
    ) -> SessionResult<Self> {
        log_debug!(logger, "[Session] Connecting with {:?}", config);
        let client = McpClient::connect(&config.server, logger.clone()).await?;
        Ok(Self::new(provider, Arc::new(client), config, logger))
    }

    /// Wait the configured settle delay, then fetch the catalog
    pub async fn settle_and_initialize(&self) -> SessionResult<()> {
        let settle_delay = self.config.settle_delay;
        if !settle_delay.is_zero() {
            log_info!(self.logger, "[Session] Waiting {:?} for the tool server to settle", settle_delay);
            tokio::time::sleep(settle_delay).await;
        }
        self.initialize().await
    }

    /// Fetch the tool catalog
    pub async fn initialize(&self) -> SessionResult<()> {
        self.registry.refresh().await?;
        log_info!(self.logger, "[Session] Ready with {} tools", self.registry.tool_count());
        Ok(())
    }

    /// The catalog fetched at startup
    pub fn catalog(&self) -> ToolCatalog {
        self.registry.catalog()
    }

    /// Select tools for `query`, then run the conversation with them
    pub async fn process_query(&self, query: &str) -> SessionResult<String> {
        let catalog = self.registry.catalog();
        let tool_set = self.selector.select(query, &catalog).await;
        let answer = self.driver.run(query, &tool_set).await?;
        Ok(answer)
    }

    /// Close the tool server connection. Later calls do nothing.
    pub async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        log_info!(self.logger, "[Session] Shutting down");
        if let Err(e) = self.registry.close().await {
            log_warn!(self.logger, "[Session] Error while closing tool server connection: {}", e);
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
