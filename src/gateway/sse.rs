//! SSE (Server-Sent Events) parser for the chat stream
//!
//! The backend frames each event as a single `data: {json}` line. Bytes are
//! buffered until a newline arrives, so a JSON payload (or a multibyte
//! character) split across network reads is only decoded once complete.
//! Lines that fail to parse are dropped without ending the stream.

use serde_json::Value;

const DATA_PREFIX: &str = "data: ";

/// A decoded chat stream event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Server assigned (or confirmed) the conversation session
    Session(String),
    /// Incremental answer text
    Token(String),
    /// Complete answer text, replacing anything streamed so far
    Content(String),
    /// Answer finished
    Done,
    /// Backend reported an error mid-stream
    Error(String),
}

/// Buffered line parser for `data:`-framed events
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed a chunk of bytes and return the events on every completed line
    ///
    /// An unterminated tail stays buffered for the next call.
    pub fn parse_chunk(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(newline_pos) = memchr::memchr(b'\n', &self.buffer) {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            if let Some(event) = Self::parse_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Parse whatever is left once the transport has ended
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let rest = std::mem::take(&mut self.buffer);
        Self::parse_line(&rest)
    }

    /// Number of buffered bytes waiting for a newline
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    fn parse_line(line: &[u8]) -> Option<StreamEvent> {
        let line = std::str::from_utf8(line).ok()?;
        let line = line.trim_end_matches(['\n', '\r']);
        let data = line.strip_prefix(DATA_PREFIX)?;
        Self::parse_event(data)
    }

    /// Decode one event payload; `None` for malformed or unknown events
    pub(crate) fn parse_event(data: &str) -> Option<StreamEvent> {
        let json: Value = serde_json::from_str(data).ok()?;

        let text = |field: &str| json.get(field)?.as_str().map(str::to_string);

        match json.get("type")?.as_str()? {
            "session" => text("session_id").map(StreamEvent::Session),
            "token" => text("content").map(StreamEvent::Token),
            "content" => text("content").map(StreamEvent::Content),
            "done" => Some(StreamEvent::Done),
            "error" => Some(StreamEvent::Error(
                text("message").unwrap_or_else(|| "Unknown error".to_string()),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod sse_tests;
