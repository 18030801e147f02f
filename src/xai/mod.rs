//! Answer-engine client for xAI's Grok Responses API.
//!
//! Each search is a single user turn with the engine's own `x_search` tool
//! enabled; no conversation history is carried between calls.
//!
//! - [`XaiClient::search`] returns the complete answer with citations.
//! - [`XaiClient::search_stream`] returns a [`SearchStream`] of text
//!   fragments decoded from the SSE body.

pub mod client;
pub mod stream;
pub mod types;

use async_trait::async_trait;

pub use client::{parse_response, XaiClient};
pub use stream::{SearchStream, SseDecoder};
pub use types::{Citation, SearchResult};

use crate::error::XaiError;

/// Something that can answer a search query.
///
/// The tool adapter depends on this rather than on [`XaiClient`] directly.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Runs a non-streaming search for `query`.
    async fn search(&self, query: &str) -> Result<SearchResult, XaiError>;
}
