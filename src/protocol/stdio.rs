//! Newline-delimited JSON-RPC over a byte stream.
//!
//! One message per line. Requests are handled in arrival order and each
//! response is written and flushed before the next line is read. The loop
//! ends cleanly when the reader reaches end of input.

use super::types::{parse_message, JsonRpcResponse};
use super::dispatch::dispatch;
use crate::state::AppState;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Serve requests from `reader` until end of input, writing replies to `writer`.
pub async fn serve<R, W>(state: Arc<AppState>, mut reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(4096);
    let mut handled: u64 = 0;

    // Raw bytes, so a line that is not UTF-8 becomes a parse error instead of ending the loop.
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = trim_line(&buf);
        if line.is_empty() {
            continue;
        }

        let response = match parse_message(line) {
            Ok(request) => dispatch(Arc::clone(&state), request).await,
            Err(error_response) => {
                tracing::warn!("Rejected malformed message");
                Some(error_response)
            }
        };

        if let Some(response) = response {
            write_response(&mut writer, &response).await?;
        }
        handled += 1;
    }

    tracing::info!(messages = handled, "Input closed, stopping stdio transport");
    Ok(())
}

/// Serve on the process's stdin and stdout. Logs must go to stderr.
pub async fn serve_stdio(state: Arc<AppState>) -> anyhow::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(state, stdin, tokio::io::stdout()).await
}

fn trim_line(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> anyhow::Result<()> {
    let mut encoded = serde_json::to_vec(response)?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await?;
    Ok(())
}
