//! JSON-RPC method dispatch for the MCP server.
//!
//! The dispatcher is stateless: every call to [`Dispatcher::handle`] is
//! independent, so one instance is shared (behind `Arc`) by all transports
//! and all concurrent HTTP requests.
//!
//! Handlers return `Result<Value, DispatchError>`; this module is the single
//! place where their failures become JSON-RPC error objects. Tool failures
//! are not handler failures: they arrive as a successful `ToolCallResult`
//! with `isError: true`.

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use crate::mcp::protocol::{
    ErrorCode, JsonRpcErrorData, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION,
};
use crate::mcp::types::{InitializeResult, ServerCapabilities, ServerInfo, ToolCallParams};
use crate::tools::ToolRegistry;

/// A failure inside a method handler.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No handler for the method.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// The params do not match what the method expects.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// `tools/call` named a tool that is not registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A handler result could not be serialised.
    #[error("failed to serialise result: {0}")]
    Serialise(#[from] serde_json::Error),
}

impl DispatchError {
    /// The JSON-RPC error code this failure maps to.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MethodNotFound(_) => ErrorCode::MethodNotFound,
            Self::InvalidParams(_) | Self::UnknownTool(_) => ErrorCode::InvalidParams,
            Self::Serialise(_) => ErrorCode::InternalError,
        }
    }

    fn into_error_data(self) -> JsonRpcErrorData {
        JsonRpcErrorData::with_message(self.code(), self.to_string())
    }
}

/// Routes JSON-RPC requests to MCP method handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tools: ToolRegistry,
    server_info: ServerInfo,
}

impl Dispatcher {
    /// Creates a dispatcher serving `tools`.
    #[must_use]
    pub fn new(tools: ToolRegistry) -> Self {
        Self {
            tools,
            server_info: ServerInfo::default(),
        }
    }

    /// Returns the server identity reported by `initialize`.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Handles one request. Never fails: every error becomes an error response
    /// carrying the request's id.
    pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %request.method, id = ?request.id, "Dispatching request");

        match self.route(&request).await {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(e) => {
                if matches!(e.code(), ErrorCode::InternalError) {
                    error!(method = %request.method, error = %e, "Request failed");
                } else {
                    debug!(method = %request.method, error = %e, "Request rejected");
                }
                JsonRpcResponse::failure(request.id, e.into_error_data())
            }
        }
    }

    /// Validates a parsed JSON value as a request, then handles it.
    pub async fn handle_value(&self, value: Value) -> JsonRpcResponse {
        match JsonRpcRequest::from_value(value) {
            Ok(request) => self.handle(request).await,
            Err(response) => response,
        }
    }

    async fn route(&self, request: &JsonRpcRequest) -> Result<Value, DispatchError> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(request.params.as_ref()).await,
            "ping" | "notifications/initialized" => Ok(json!({})),
            other => Err(DispatchError::MethodNotFound(other.to_string())),
        }
    }

    /// Handles the initialize request.
    ///
    /// Client params are accepted as-is; the server always answers with the
    /// one protocol version it speaks.
    fn handle_initialize(&self) -> Result<Value, DispatchError> {
        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: self.server_info.clone(),
        };
        Ok(serde_json::to_value(result)?)
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self) -> Value {
        json!({
            "tools": self.tools.definitions(),
        })
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(&self, params: Option<&Value>) -> Result<Value, DispatchError> {
        let params: ToolCallParams = params
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| DispatchError::InvalidParams(format!("Invalid tool call params: {e}")))?
            .ok_or_else(|| DispatchError::InvalidParams("Missing tool call params".to_string()))?;

        let tool = self
            .tools
            .get(&params.name)
            .ok_or_else(|| DispatchError::UnknownTool(params.name.clone()))?;

        let arguments = params.arguments.unwrap_or_default();
        let result = tool.execute(&arguments).await;

        Ok(serde_json::to_value(result)?)
    }
}
