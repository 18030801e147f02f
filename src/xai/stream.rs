//! Incremental decoding of streamed Responses API output.
//!
//! The API streams Server-Sent Events: newline-terminated `data: <json>`
//! lines, separated by blank lines and terminated by `data: [DONE]`.
//!
//! [`SseDecoder`] is a pure state machine fed raw body chunks.
//! [`SearchStream`] owns the HTTP response and pulls chunks through the
//! decoder one read at a time. Dropping it releases the connection.

use std::collections::VecDeque;

use futures::Stream;
use tracing::{debug, trace};

use crate::error::XaiError;
use crate::xai::types::StreamChunk;

/// Prefix of an SSE data line.
const DATA_PREFIX: &str = "data: ";

/// Payload that ends the stream.
const DONE_SENTINEL: &str = "[DONE]";

/// Byte-fed SSE decoder that yields text fragments.
///
/// Bytes are buffered until a `\n` completes a line, so multi-byte UTF-8
/// sequences split across network reads are decoded intact.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes of the current, not yet terminated line.
    buffer: Vec<u8>,
    /// Set once `[DONE]` has been seen.
    done: bool,
}

impl SseDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once the `[DONE]` sentinel has been decoded.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Feeds a chunk of body bytes and returns the fragments it completes.
    ///
    /// Input after `[DONE]` is discarded.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut fragments = Vec::new();
        if self.done {
            return fragments;
        }

        self.buffer.extend_from_slice(bytes);

        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.process_line(&line[..newline], &mut fragments);

            if self.done {
                self.buffer.clear();
                break;
            }
        }

        fragments
    }

    /// Flushes a final line that was not newline-terminated.
    ///
    /// Called once the body has ended.
    pub fn finish(&mut self) -> Vec<String> {
        let mut fragments = Vec::new();
        if !self.done && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.process_line(&line, &mut fragments);
        }
        self.buffer.clear();
        fragments
    }

    fn process_line(&mut self, line: &[u8], fragments: &mut Vec<String>) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let line = String::from_utf8_lossy(line);

        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return;
        };
        let payload = payload.trim();

        if payload == DONE_SENTINEL {
            self.done = true;
            return;
        }

        match serde_json::from_str::<StreamChunk>(payload) {
            Ok(chunk) => {
                if let Some(text) = chunk.text() {
                    fragments.push(text.to_string());
                }
            }
            Err(e) => {
                // Garbled frames are dropped so one bad chunk cannot end the stream.
                trace!(error = %e, "Skipping unparseable stream chunk");
            }
        }
    }
}

/// A lazy, single-consumer sequence of text fragments from one streamed search.
///
/// Each call to [`crate::xai::XaiClient::search_stream`] opens a fresh
/// connection; a `SearchStream` cannot be restarted. The response is released
/// as soon as the stream terminates (on `[DONE]`, end of body, or a read
/// error) and in any case when the stream is dropped.
#[derive(Debug)]
pub struct SearchStream {
    /// The open response, `None` once released.
    response: Option<reqwest::Response>,
    decoder: SseDecoder,
    /// Fragments decoded but not yet handed out.
    pending: VecDeque<String>,
}

impl SearchStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            response: Some(response),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
        }
    }

    /// Returns the next fragment, or `None` when the stream has ended.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the body fails. The connection is released
    /// and subsequent calls return `Ok(None)`.
    pub async fn next(&mut self) -> Result<Option<String>, XaiError> {
        loop {
            if let Some(fragment) = self.pending.pop_front() {
                return Ok(Some(fragment));
            }

            if self.decoder.is_done() {
                self.release();
                return Ok(None);
            }

            let Some(response) = self.response.as_mut() else {
                return Ok(None);
            };

            match response.chunk().await {
                Ok(Some(bytes)) => {
                    trace!(len = bytes.len(), "Read stream chunk");
                    self.pending.extend(self.decoder.feed(&bytes));
                }
                Ok(None) => {
                    self.release();
                    self.pending.extend(self.decoder.finish());
                }
                Err(e) => {
                    self.release();
                    return Err(e.into());
                }
            }
        }
    }

    /// Collects every remaining fragment into one string.
    ///
    /// # Errors
    ///
    /// Returns the first read error.
    pub async fn collect_text(mut self) -> Result<String, XaiError> {
        let mut text = String::new();
        while let Some(fragment) = self.next().await? {
            text.push_str(&fragment);
        }
        Ok(text)
    }

    /// Adapts this stream into a [`futures::Stream`].
    ///
    /// The adaptor ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<String, XaiError>> {
        futures::stream::unfold(Some(self), |state| async move {
            let mut stream = state?;
            match stream.next().await {
                Ok(Some(fragment)) => Some((Ok(fragment), Some(stream))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    fn release(&mut self) {
        if self.response.take().is_some() {
            debug!("Released streaming response");
        }
    }
}
