//! Accumulates an OpenAI-style `text/event-stream` of chat-completion chunks into one string.
//!
//! Network chunks may split a line (or a UTF-8 sequence) anywhere, so raw bytes are buffered
//! until a newline arrives.
//! Only `data:` lines are inspected; `[DONE]` ends the stream. An `error` event ends it
//! with `LlmError::Stream`.

use serde::Deserialize;
use tracing::debug;

use crate::llm_client::LlmError;

const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Default)]
pub struct SseAccumulator {
    buffer: Vec<u8>,
    content: String,
    done: bool,
    fragments: usize,
}

impl SseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw bytes from the response body. Returns `true` once `[DONE]` has been seen,
    /// or the provider's message if it sent an error event.
    pub fn push(&mut self, bytes: &[u8]) -> Result<bool, LlmError> {
        if self.done {
            return Ok(true);
        }
        self.buffer.extend_from_slice(bytes);

        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.consume_line(String::from_utf8_lossy(&line).trim())?;
            if self.done {
                self.buffer.clear();
                break;
            }
        }
        Ok(self.done)
    }

    /// Flushes any trailing line without a newline and returns the concatenated content.
    pub fn finish(mut self) -> Result<String, LlmError> {
        if !self.done {
            let rest = std::mem::take(&mut self.buffer);
            self.consume_line(String::from_utf8_lossy(&rest).trim())?;
        }
        debug!(
            "SSE stream accumulated {} fragments, {} bytes",
            self.fragments,
            self.content.len()
        );
        Ok(self.content)
    }

    fn consume_line(&mut self, line: &str) -> Result<(), LlmError> {
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(());
        };
        let data = data.trim();
        if data == DONE_MARKER {
            self.done = true;
            return Ok(());
        }
        if data.is_empty() {
            return Ok(());
        }

        // Keep-alive or provider-specific events that are not chunks are skipped.
        let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) else {
            debug!("Skipping non-chunk SSE data line");
            return Ok(());
        };
        if let Some(error) = chunk.error {
            self.done = true;
            return Err(LlmError::Stream(
                error
                    .message
                    .unwrap_or_else(|| "provider sent an error event".to_string()),
            ));
        }
        if let Some(text) = chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
        {
            self.content.push_str(&text);
            self.fragments += 1;
        }
        Ok(())
    }
}
