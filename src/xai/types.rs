//! Wire types for the xAI Responses API.
//!
//! Only the fields this server reads are modelled. Output and content items
//! of types we don't know about deserialise to an `Other` variant instead of
//! failing the whole response.

use serde::{Deserialize, Deserializer, Serialize};

/// Reads an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Role of an input message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user.
    User,
    /// The model.
    Assistant,
}

/// One conversation turn sent to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMessage {
    /// Who is speaking.
    pub role: Role,
    /// The message text.
    pub content: String,
}

/// Server-side tools the engine may use while answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchToolKind {
    /// Search posts on X.
    XSearch,
    /// Search the open web.
    WebSearch,
}

/// A tool directive in the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchToolSpec {
    /// The tool to enable.
    #[serde(rename = "type")]
    pub kind: SearchToolKind,
}

/// Body of `POST /responses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponsesRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation input. Always a single user turn here.
    pub input: Vec<InputMessage>,
    /// Tools the engine may call.
    pub tools: Vec<SearchToolSpec>,
    /// Request an SSE stream instead of a single JSON body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ResponsesRequest {
    /// Builds a single-turn X search request for `query`.
    #[must_use]
    pub fn x_search(model: &str, query: &str, stream: bool) -> Self {
        Self {
            model: model.to_string(),
            input: vec![InputMessage {
                role: Role::User,
                content: query.to_string(),
            }],
            tools: vec![SearchToolSpec {
                kind: SearchToolKind::XSearch,
            }],
            stream: stream.then_some(true),
        }
    }
}

/// A source reference attached to generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Annotation type, e.g. `url_citation`.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Link to the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Excerpt from the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// A content item inside a `message` output item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ContentItem {
    /// Generated text with its annotations.
    #[serde(rename = "output_text")]
    OutputText(OutputText),
    /// Anything else.
    #[serde(other)]
    Other,
}

/// Generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputText {
    /// The text itself.
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Citations backing the text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: Vec<Citation>,
}

/// A `message` output item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageOutput {
    /// Item id.
    #[serde(default)]
    pub id: Option<String>,
    /// Author role, normally `assistant`.
    #[serde(default)]
    pub role: Option<String>,
    /// Content items. `None` when the field is absent.
    #[serde(default)]
    pub content: Option<Vec<ContentItem>>,
}

impl MessageOutput {
    /// Returns the first `output_text` content item.
    #[must_use]
    pub fn output_text(&self) -> Option<&OutputText> {
        self.content.as_deref()?.iter().find_map(|item| match item {
            ContentItem::OutputText(text) => Some(text),
            ContentItem::Other => None,
        })
    }
}

/// One item of the response's `output` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum OutputItem {
    /// The assistant's answer.
    #[serde(rename = "message")]
    Message(MessageOutput),
    /// Tool calls, reasoning and other items we don't consume.
    #[serde(other)]
    Other,
}

/// Returns the first `message` item in `output`.
fn first_message(output: &[OutputItem]) -> Option<&MessageOutput> {
    output.iter().find_map(|item| match item {
        OutputItem::Message(message) => Some(message),
        OutputItem::Other => None,
    })
}

/// Token accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Tokens generated.
    #[serde(default)]
    pub completion_tokens: u64,
    /// Sum of both.
    #[serde(default)]
    pub total_tokens: u64,
}

/// Body of a successful non-streaming `POST /responses`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponsesResponse {
    /// Response id.
    pub id: String,
    /// Object kind, `response`.
    #[serde(default)]
    pub object: Option<String>,
    /// Completion status.
    #[serde(default)]
    pub status: Option<String>,
    /// Model that produced the answer.
    #[serde(default)]
    pub model: Option<String>,
    /// Output items in generation order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: Vec<OutputItem>,
    /// Token usage, if reported.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ResponsesResponse {
    /// Returns the first `message` output item.
    #[must_use]
    pub fn message(&self) -> Option<&MessageOutput> {
        first_message(&self.output)
    }
}

/// One `data:` payload of a streamed response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamChunk {
    /// Output items carried by this chunk.
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: Vec<OutputItem>,
}

impl StreamChunk {
    /// Returns the chunk's non-empty `output_text`, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        first_message(&self.output)
            .and_then(MessageOutput::output_text)
            .map(|text| text.text.as_str())
            .filter(|text| !text.is_empty())
    }
}

/// The uniform result of a non-streaming search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Upstream response id.
    pub id: String,
    /// Answer text.
    pub text: String,
    /// Sources, in the order the engine returned them.
    pub citations: Vec<Citation>,
}
