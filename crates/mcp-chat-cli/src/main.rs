mod logging;
mod shell;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use mcp_chat_core::{AnthropicProvider, ChatConfig, Logger, Session, TracingLogger};
use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional
    dotenvy::dotenv().ok();

    logging::init_logging();
    info!("mcp-chat started");

    let session = tokio::select! {
        result = connect() => match result {
            Ok(session) => session,
            Err(e) => return fail(e),
        },
        _ = shutdown_signal() => {
            info!("interrupted while connecting");
            return ExitCode::SUCCESS;
        }
    };

    // From here on the connection is open and must be closed on every path
    let outcome = tokio::select! {
        result = serve(&session) => result,
        _ = shutdown_signal() => {
            info!("interrupted");
            Ok(())
        }
    };

    session.shutdown().await;

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

async fn connect() -> anyhow::Result<Session> {
    let config = ChatConfig::from_env().context("invalid configuration")?;

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());
    let provider = Arc::new(AnthropicProvider::new(logger.clone()));

    Session::connect(config, provider, logger)
        .await
        .context("failed to connect to the tool server")
}

async fn serve(session: &Session) -> anyhow::Result<()> {
    session
        .settle_and_initialize()
        .await
        .context("failed to fetch the tool catalog")?;

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    shell::run(session, stdin, stdout)
        .await
        .context("terminal I/O failed")
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => info!("SIGTERM received"),
                }
            }
            Err(e) => {
                error!("failed to register SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn fail(e: anyhow::Error) -> ExitCode {
    error!("{:#}", e);
    eprintln!("mcp-chat: {:#}", e);
    ExitCode::from(1)
}
