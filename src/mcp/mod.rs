//! Model Context Protocol (MCP) server implementation.
//!
//! This module implements the MCP specification for exposing X search as a
//! tool to AI assistants. Messages are JSON-RPC 2.0, carried over either
//! stdio or HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌──────────────┐    ┌──────────────┐    ┌─────────────┐    │
//! │   │  Transport   │───▶│  Dispatcher  │───▶│    Tools    │    │
//! │   │ (stdio/http) │    │  (JSON-RPC)  │    │  (x_search) │    │
//! │   └──────────────┘    └──────────────┘    └─────────────┘    │
//! │                                                  │           │
//! │                                                  ▼           │
//! │                                           ┌─────────────┐    │
//! │                                           │ xAI client  │    │
//! │                                           └─────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod dispatcher;
pub mod protocol;
pub mod transport;
pub mod types;

pub use dispatcher::{DispatchError, Dispatcher};
pub use protocol::{
    parse_message, JsonRpcRequest, JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION,
};
pub use transport::{HttpTransport, StdioTransport, Transport};
pub use types::{ToolCallResult, ToolDefinition};
