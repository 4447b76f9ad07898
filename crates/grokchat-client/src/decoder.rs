//! Incremental decoder for the chat reply stream.
//!
//! The backend answers with server-sent events: blocks separated by a blank
//! line, of which only `data:` blocks carry anything. A payload of `[DONE]`
//! ends the reply, a payload starting with `[ERROR]` aborts it, and anything
//! else is a fragment of assistant text.

use std::collections::VecDeque;

use tokio_stream::StreamExt;
use tracing::{debug, trace};

use crate::error::ClientError;
use crate::transport::ByteStream;

const EVENT_DELIMITER: &str = "\n\n";
const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";
const ERROR_PREFIX: &str = "[ERROR]";

/// One decoded item of the reply stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A piece of assistant text.
    Fragment(String),
    /// The completion sentinel was received.
    Done,
    /// The server reported an error; carries the detail text.
    Error(String),
    /// The byte stream ended without a sentinel.
    Truncated,
}

impl StreamEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Fragment(_))
    }
}

/// UTF-8 decoding that carries partial multi-byte sequences across chunks.
///
/// Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::new();
        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(text) => {
                    out.push_str(text);
                    start = self.pending.len();
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[start..valid_end]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + len;
                        }
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..start);
        out
    }

    fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}

/// Push-based decoder: feed it byte chunks, get stream events back.
#[derive(Debug, Default)]
pub struct SseDecoder {
    utf8: Utf8Decoder,
    buffer: String,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a terminal event has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Decode one chunk and return every complete event it finished.
    ///
    /// Chunk boundaries may fall anywhere, including inside a multi-byte
    /// character or an event delimiter. Input after a terminal event is
    /// ignored.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        let text = self.utf8.decode(chunk);
        self.buffer.push_str(&text);

        while let Some(idx) = self.buffer.find(EVENT_DELIMITER) {
            let block: String = self.buffer.drain(..idx + EVENT_DELIMITER.len()).collect();
            let Some(event) = parse_block(&block[..idx]) else {
                continue;
            };

            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                self.finished = true;
                self.buffer.clear();
                break;
            }
        }

        events
    }

    /// Signal the end of the byte stream.
    ///
    /// Returns `Truncated` unless a sentinel was already seen. Any incomplete
    /// trailing block is discarded.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        if self.finished {
            return None;
        }
        self.finished = true;

        self.buffer.push_str(&self.utf8.finish());
        if !self.buffer.trim().is_empty() {
            debug!(
                bytes = self.buffer.len(),
                "Discarding incomplete event at end of stream"
            );
        }
        self.buffer.clear();
        Some(StreamEvent::Truncated)
    }
}

/// Extract the event carried by one delimited block, if any.
fn parse_block(block: &str) -> Option<StreamEvent> {
    let payload = block.trim().strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() {
        return None;
    }

    if payload == DONE_SENTINEL {
        return Some(StreamEvent::Done);
    }
    if let Some(detail) = payload.strip_prefix(ERROR_PREFIX) {
        return Some(StreamEvent::Error(detail.trim().to_string()));
    }
    Some(StreamEvent::Fragment(payload.to_string()))
}

/// Lazily decode a response body into stream events.
pub fn decode_stream(body: ByteStream) -> EventReader {
    EventReader {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        done: false,
    }
}

/// Pull-based reader over a response body.
///
/// Yields events in arrival order and stops after the first terminal event
/// or transport failure. The body is not polled past that point.
pub struct EventReader {
    body: ByteStream,
    decoder: SseDecoder,
    pending: VecDeque<StreamEvent>,
    done: bool,
}

impl EventReader {
    /// Next decoded event, or `None` once the stream has ended.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent, ClientError>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.done {
                return None;
            }

            match self.body.next().await {
                Some(Ok(chunk)) => {
                    trace!(len = chunk.len(), "Received chunk");
                    self.pending.extend(self.decoder.feed(&chunk));
                    self.done = self.decoder.is_finished();
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    self.pending.extend(self.decoder.finish());
                }
            }
        }
    }
}
