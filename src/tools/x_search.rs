//! The `x_search` tool: searches X (Twitter) through Grok.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::mcp::types::{ToolCallResult, ToolDefinition};
use crate::tools::Tool;
use crate::xai::{Citation, SearchProvider, SearchResult};

/// Name under which the tool is advertised.
pub const X_SEARCH_TOOL_NAME: &str = "x_search";

/// Prefix of every error result.
const ERROR_PREFIX: &str = "Error executing X search";

/// Title used for citations that have none.
const DEFAULT_CITATION_TITLE: &str = "Source";

/// Adapts a [`SearchProvider`] to the MCP tool interface.
#[derive(Clone)]
pub struct XSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl XSearchTool {
    /// Creates the tool on top of `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    /// Builds the success result: answer text, then the citation block if any.
    fn format_result(result: &SearchResult) -> ToolCallResult {
        let text = match format_citations(&result.citations) {
            Some(sources) => format!("{}\n\n{sources}", result.text),
            None => result.text.clone(),
        };
        ToolCallResult::text(text)
    }
}

#[async_trait]
impl Tool for XSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: X_SEARCH_TOOL_NAME.to_string(),
            description:
                "Search X (Twitter) for posts, users, and threads using XAI's Grok search capabilities"
                    .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to find relevant X posts and content"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, arguments: &Map<String, Value>) -> ToolCallResult {
        let Some(query) = arguments
            .get("query")
            .and_then(Value::as_str)
            .filter(|query| !query.is_empty())
        else {
            warn!(tool = X_SEARCH_TOOL_NAME, "Rejected call without a query");
            return ToolCallResult::error(format!(
                "{ERROR_PREFIX}: Query parameter is required and must be a string"
            ));
        };

        info!(
            tool = X_SEARCH_TOOL_NAME,
            query_len = query.len(),
            "Executing search"
        );

        match self.provider.search(query).await {
            Ok(result) => {
                info!(
                    tool = X_SEARCH_TOOL_NAME,
                    id = %result.id,
                    citations = result.citations.len(),
                    "Search completed"
                );
                Self::format_result(&result)
            }
            Err(e) => {
                warn!(tool = X_SEARCH_TOOL_NAME, error = %e, "Search failed");
                ToolCallResult::error(format!("{ERROR_PREFIX}: {e}"))
            }
        }
    }
}

/// Renders citations as a Markdown source list.
///
/// Lines are numbered by the citation's position in the input, so dropped
/// entries leave gaps. Citations without a URL are dropped. Returns `None`
/// when nothing survives.
#[must_use]
pub fn format_citations(citations: &[Citation]) -> Option<String> {
    let mut lines = citations
        .iter()
        .enumerate()
        .filter_map(|(index, citation)| {
            let url = citation.url.as_deref().filter(|url| !url.is_empty())?;
            let title = citation
                .title
                .as_deref()
                .filter(|title| !title.is_empty())
                .unwrap_or(DEFAULT_CITATION_TITLE);
            Some((index + 1, title, url))
        })
        .peekable();

    lines.peek()?;

    let mut block = String::from("**Sources:**");
    for (number, title, url) in lines {
        let _ = write!(block, "\n{number}. [{title}]({url})");
    }
    Some(block)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::XaiError;

    /// Provider that records calls and answers from a fixed script.
    struct FakeProvider {
        calls: AtomicUsize,
        answer: fn() -> Result<SearchResult, XaiError>,
    }

    impl FakeProvider {
        fn new(answer: fn() -> Result<SearchResult, XaiError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                answer,
            })
        }
    }

    #[async_trait]
    impl SearchProvider for FakeProvider {
        async fn search(&self, _query: &str) -> Result<SearchResult, XaiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)()
        }
    }

    fn citation(title: Option<&str>, url: Option<&str>) -> Citation {
        Citation {
            kind: "url_citation".to_string(),
            url: url.map(str::to_string),
            title: title.map(str::to_string),
            snippet: None,
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn citations_skip_entries_without_url() {
        let block = format_citations(&[
            citation(Some("A"), Some("http://a")),
            citation(None, Some("")),
        ])
        .unwrap();

        assert_eq!(block, "**Sources:**\n1. [A](http://a)");
    }

    #[test]
    fn citations_default_title_and_keep_original_numbering() {
        let block = format_citations(&[
            citation(Some("A"), None),
            citation(None, Some("http://b")),
        ])
        .unwrap();

        assert_eq!(block, "**Sources:**\n2. [Source](http://b)");
    }

    #[test]
    fn no_citations_no_block() {
        assert_eq!(format_citations(&[]), None);
        assert_eq!(format_citations(&[citation(Some("A"), None)]), None);
    }

    #[tokio::test]
    async fn missing_query_makes_no_call() {
        let provider = FakeProvider::new(|| Err(XaiError::NoMessageContent));
        let tool = XSearchTool::new(provider.clone());

        let result = tool.execute(&Map::new()).await;

        assert!(result.is_error);
        assert!(result
            .first_text()
            .unwrap()
            .contains("Query parameter is required and must be a string"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_string_query_is_rejected() {
        let provider = FakeProvider::new(|| Err(XaiError::NoMessageContent));
        let tool = XSearchTool::new(provider.clone());

        let result = tool.execute(&args(json!({"query": 42}))).await;

        assert!(result.is_error);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_appends_sources() {
        let provider = FakeProvider::new(|| {
            Ok(SearchResult {
                id: "r1".to_string(),
                text: "Rust 2.0 is not real.".to_string(),
                citations: vec![Citation {
                    kind: "url_citation".to_string(),
                    url: Some("https://x.com/rustlang/status/1".to_string()),
                    title: Some("Rust".to_string()),
                    snippet: None,
                }],
            })
        });
        let tool = XSearchTool::new(provider.clone());

        let result = tool.execute(&args(json!({"query": "rust"}))).await;

        assert!(!result.is_error);
        assert_eq!(
            result.first_text(),
            Some(
                "Rust 2.0 is not real.\n\n**Sources:**\n1. [Rust](https://x.com/rustlang/status/1)"
            )
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn success_without_citations_is_plain_text() {
        let provider = FakeProvider::new(|| {
            Ok(SearchResult {
                id: "r2".to_string(),
                text: "Nothing cited.".to_string(),
                citations: Vec::new(),
            })
        });
        let tool = XSearchTool::new(provider);

        let result = tool.execute(&args(json!({"query": "q"}))).await;

        assert_eq!(result.first_text(), Some("Nothing cited."));
    }

    #[tokio::test]
    async fn upstream_failure_becomes_tool_error() {
        let provider = FakeProvider::new(|| {
            Err(XaiError::Api {
                status: 500,
                body: "overloaded".to_string(),
            })
        });
        let tool = XSearchTool::new(provider);

        let result = tool.execute(&args(json!({"query": "q"}))).await;

        assert!(result.is_error);
        assert_eq!(
            result.first_text(),
            Some("Error executing X search: XAI API error (500): overloaded")
        );
    }

    #[test]
    fn definition_requires_query() {
        let provider = FakeProvider::new(|| Err(XaiError::NoTextContent));
        let definition = XSearchTool::new(provider).definition();

        assert_eq!(definition.name, "x_search");
        assert_eq!(definition.input_schema["required"], json!(["query"]));
        assert_eq!(definition.input_schema["properties"]["query"]["type"], "string");
    }
}
