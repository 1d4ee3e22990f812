//! Tracing subscriber setup
//!
//! Events go to stderr so they never interleave with answers on stdout.
//! The filter comes from `MCP_CHAT_LOG` (e.g. `mcp_chat=debug,rmcp=info`).

use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "MCP_CHAT_LOG";
const DEFAULT_FILTER: &str = "warn";

pub fn init_logging() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // try_init: a second call (tests) leaves the first subscriber in place
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .try_init();
}
