//! # SSE decoder
//!
//! Incremental Server-Sent Events decoder for the content feed.
//!
//! The backend pushes named events (`message`, `navigation`) over a single
//! long-lived response. Chunks arrive at arbitrary byte boundaries, so the
//! decoder buffers raw bytes, splits on newlines, and assembles fields into
//! [`SseFrame`]s that are dispatched on each blank line:
//! - `event:` names the frame (defaults to `message`)
//! - `data:` lines are joined with `\n`
//! - `id:` is carried through
//! - `retry:` updates the reconnection delay hint
//! - lines starting with `:` are comments (keep-alives)

use std::time::Duration;

use bytes::BytesMut;

/// Event name used when a frame carries no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

/// Incremental decoder. Feed it chunks with [`push`](Self::push).
#[derive(Debug)]
pub struct SseDecoder {
    buffer: BytesMut,
    event: Option<String>,
    data: String,
    has_data: bool,
    id: Option<String>,
    retry: Option<Duration>,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            event: None,
            data: String::new(),
            has_data: false,
            id: None,
            retry: None,
        }
    }

    /// Last `retry:` hint received from the server, if any.
    pub fn retry(&self) -> Option<Duration> {
        self.retry
    }

    /// Append a chunk and return every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();

        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line_bytes = self.buffer.split_to(newline_pos + 1);
            line_bytes.truncate(line_bytes.len() - 1);
            if line_bytes.last() == Some(&b'\r') {
                line_bytes.truncate(line_bytes.len() - 1);
            }

            // Invalid UTF-8 lines are skipped rather than poisoning the frame.
            let Ok(line) = std::str::from_utf8(&line_bytes) else {
                continue;
            };

            if let Some(frame) = self.process_line(line) {
                frames.push(frame);
            }
        }

        frames
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_owned()),
            "data" => {
                if self.has_data {
                    self.data.push('\n');
                }
                self.data.push_str(value);
                self.has_data = true;
            }
            "id" => {
                if !value.contains('\0') {
                    self.id = Some(value.to_owned());
                }
            }
            "retry" => {
                if let Ok(ms) = value.parse::<u64>() {
                    self.retry = Some(Duration::from_millis(ms));
                }
            }
            _ => {}
        }

        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if !self.has_data {
            return None;
        }
        self.has_data = false;

        Some(SseFrame {
            event: event
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_owned()),
            data: std::mem::take(&mut self.data),
            id: self.id.clone(),
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────
