//! # SSE Parser
//!
//! Line-oriented Server-Sent Events parser for `streamGenerateContent?alt=sse`.
//!
//! - Line buffering across arbitrarily split network chunks
//! - `data:` payload extraction (with or without a space), CRLF tolerant
//! - `[DONE]` markers, comments and other fields are skipped
//! - A final unterminated line is still delivered at end of stream
//!
//! Read failures are yielded as [`ChatError::Stream`] and end the stream;
//! they are never swallowed.

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};

use crate::errors::ChatError;

/// Parse SSE lines from a byte stream and yield the `data:` payloads.
pub fn parse_sse_lines<S, E>(byte_stream: S) -> impl Stream<Item = Result<String, ChatError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin + 'static,
    E: std::fmt::Display + Send,
{
    futures::stream::unfold(
        (byte_stream, BytesMut::with_capacity(8192), false),
        |(mut stream, mut buffer, done)| async move {
            if done {
                return None;
            }

            loop {
                if let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let mut line_bytes = buffer.split_to(newline_pos + 1);
                    line_bytes.truncate(line_bytes.len() - 1);
                    if line_bytes.last() == Some(&b'\r') {
                        line_bytes.truncate(line_bytes.len() - 1);
                    }

                    let Ok(line) = std::str::from_utf8(&line_bytes) else {
                        let err = ChatError::Stream("invalid UTF-8 in event stream".into());
                        return Some((Err(err), (stream, buffer, true)));
                    };

                    if let Some(data) = extract_sse_data(line) {
                        return Some((Ok(data), (stream, buffer, false)));
                    }
                    continue;
                }

                match stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => {
                        let err = ChatError::Stream(format!("read failed: {e}"));
                        return Some((Err(err), (stream, buffer, true)));
                    }
                    None => {
                        if buffer.is_empty() {
                            return None;
                        }
                        let Ok(line) = std::str::from_utf8(&buffer) else {
                            let err = ChatError::Stream("invalid UTF-8 in event stream".into());
                            return Some((Err(err), (stream, buffer, true)));
                        };
                        let data = extract_sse_data(line)?;
                        buffer.clear();
                        return Some((Ok(data), (stream, buffer, true)));
                    }
                }
            }
        },
    )
}

/// Extract the data payload from an SSE line.
///
/// Returns `None` for comments, empty lines, non-data fields and `[DONE]`.
fn extract_sse_data(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }

    let data = trimmed
        .strip_prefix("data: ")
        .or_else(|| trimmed.strip_prefix("data:"))?
        .trim();

    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(data.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
