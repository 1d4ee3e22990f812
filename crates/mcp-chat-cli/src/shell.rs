//! Interactive read-eval-print loop

use std::io;

use mcp_chat_core::Session;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

const BANNER: &str = "\nMCP Client Started!\n\
Type your queries or 'quit' to exit.\n\
Type 'tools' to see a list of available tools.\n";

const PROMPT: &str = "\nQuery: ";

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Tools,
    Query(String),
}

impl Command {
    /// Commands are matched trimmed and case-insensitively; queries are kept verbatim
    pub fn parse(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "quit" => Command::Quit,
            "tools" => Command::Tools,
            _ => Command::Query(line.to_string()),
        }
    }
}

/// Next line without its `\n` or `\r\n`, or `None` at end of input.
///
/// Invalid UTF-8 is replaced rather than ending the session.
async fn read_line<R>(input: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if input.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Run the shell until `quit` or end of input.
///
/// A failed query is reported and the loop carries on.
pub async fn run<R, W>(session: &Session, mut input: R, mut output: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    output.write_all(BANNER.as_bytes()).await?;

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = read_line(&mut input, &mut buf).await? else {
            debug!("end of input");
            break;
        };

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Tools => {
                let listing = session.catalog().describe();
                output.write_all(format!("{}\n", listing).as_bytes()).await?;
            }
            Command::Query(query) => match session.process_query(&query).await {
                Ok(answer) => {
                    output.write_all(format!("\n{}\n", answer).as_bytes()).await?;
                }
                Err(e) => {
                    warn!("query failed: {}", e);
                    output.write_all(format!("Error: {}\n", e).as_bytes()).await?;
                }
            },
        }
    }

    output.flush().await
}
