//! HTTP client for the xAI Responses API.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::XaiConfig;
use crate::error::XaiError;
use crate::xai::stream::SearchStream;
use crate::xai::types::{ResponsesRequest, ResponsesResponse, SearchResult};
use crate::xai::SearchProvider;

/// Client for X search through Grok.
///
/// Holds only immutable configuration and a pooled HTTP client, so one
/// instance can be shared by every request for the life of the process.
#[derive(Debug, Clone)]
pub struct XaiClient {
    http: reqwest::Client,
    config: XaiConfig,
}

impl XaiClient {
    /// Creates a client from static configuration.
    #[must_use]
    pub fn new(config: &XaiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    /// Returns the model this client queries.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/responses", self.config.base_url)
    }

    /// Sends `request` and fails on any non-2xx status.
    async fn post(&self, request: &ResponsesRequest) -> Result<reqwest::Response, XaiError> {
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "XAI API returned an error status");
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e, "Failed to read XAI error body");
                    format!("<unreadable body: {e}>")
                }
            };
            return Err(XaiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Runs a single-turn X search and waits for the complete answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with a non-2xx
    /// status, or the body has no message text.
    pub async fn search(&self, query: &str) -> Result<SearchResult, XaiError> {
        debug!(model = %self.config.model, query_len = query.len(), "Sending XAI search");

        let request = ResponsesRequest::x_search(&self.config.model, query, false);
        let body = self.post(&request).await?.bytes().await?;

        let data: ResponsesResponse =
            serde_json::from_slice(&body).map_err(XaiError::MalformedResponse)?;

        parse_response(&data)
    }

    /// Runs a single-turn X search and streams the answer as it is generated.
    ///
    /// The returned stream owns the connection. Every call opens a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers with a
    /// non-2xx status. Errors while reading the body surface from
    /// [`SearchStream::next`].
    pub async fn search_stream(&self, query: &str) -> Result<SearchStream, XaiError> {
        debug!(model = %self.config.model, query_len = query.len(), "Opening XAI search stream");

        let request = ResponsesRequest::x_search(&self.config.model, query, true);
        let response = self.post(&request).await?;

        Ok(SearchStream::new(response))
    }
}

#[async_trait]
impl SearchProvider for XaiClient {
    async fn search(&self, query: &str) -> Result<SearchResult, XaiError> {
        Self::search(self, query).await
    }
}

/// Extracts text and citations from a complete response.
///
/// # Errors
///
/// Returns [`XaiError::NoMessageContent`] if there is no `message` item with
/// content, and [`XaiError::NoTextContent`] if that item has no `output_text`.
pub fn parse_response(data: &ResponsesResponse) -> Result<SearchResult, XaiError> {
    let message = data
        .message()
        .filter(|message| message.content.is_some())
        .ok_or(XaiError::NoMessageContent)?;

    let text = message.output_text().ok_or(XaiError::NoTextContent)?;

    Ok(SearchResult {
        id: data.id.clone(),
        text: text.text.clone(),
        citations: text.annotations.clone(),
    })
}
