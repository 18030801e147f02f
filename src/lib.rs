//! xai-mcp-server: MCP server for X (Twitter) search through xAI's Grok
//!
//! This library exposes one tool, `x_search`, to AI-agent hosts speaking the
//! Model Context Protocol.
//!
//! # Architecture
//!
//! - **Transports**: newline-delimited stdio for process embedding, or a
//!   stateless HTTP endpoint
//! - **Dispatcher**: JSON-RPC routing and error mapping
//! - **Tool adapter**: argument validation and Markdown formatting
//! - **xAI client**: Responses API calls, whole-body and SSE-streamed
//!
//! Tool failures are reported inside a successful JSON-RPC result with
//! `isError: true`; only protocol failures become JSON-RPC errors.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types
//! - [`mcp`]: MCP protocol implementation
//! - [`tools`]: Tool registry and `x_search`
//! - [`xai`]: xAI Responses API client

pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;
pub mod xai;

use std::sync::Arc;

use crate::config::XaiConfig;
use crate::mcp::Dispatcher;
use crate::tools::{ToolRegistry, XSearchTool};
use crate::xai::XaiClient;

/// Builds the dispatcher with every tool this server offers.
#[must_use]
pub fn build_dispatcher(config: &XaiConfig) -> Dispatcher {
    let client = Arc::new(XaiClient::new(config));
    Dispatcher::new(ToolRegistry::new().with_tool(XSearchTool::new(client)))
}
