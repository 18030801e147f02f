//! JSON-RPC 2.0 message types for MCP protocol.
//!
//! This module defines the envelope types shared by both transports and the
//! dispatcher. All messages follow the JSON-RPC 2.0 specification.
//!
//! # Message Types
//!
//! - **Request**: a method call; without an `id` it is a notification
//! - **Response**: exactly one of `result` or `error`, never both
//!
//! Parsing is split in two steps so transports can tell a body that is not
//! JSON at all (Parse Error) from JSON that is not a request (Invalid Request).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "xai-mcp-server";

/// The only JSON-RPC version accepted.
const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request ID.
///
/// Per the MCP specification, IDs must be strings or integers, never `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// String request ID.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

fn default_jsonrpc() -> String {
    JSONRPC_VERSION.to_string()
}

/// A JSON-RPC 2.0 request message.
///
/// A missing `jsonrpc` is read as "2.0" and a missing `method` as the empty
/// string, which the dispatcher reports as an unknown method.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be "2.0".
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,

    /// Request identifier; `None` for notifications.
    #[serde(default)]
    pub id: Option<RequestId>,

    /// The method to invoke.
    #[serde(default)]
    pub method: String,

    /// Optional parameters for the method.
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Creates a request with the given id and method.
    #[must_use]
    pub fn new(id: Option<RequestId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: default_jsonrpc(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Returns `true` if this request carries no `id`.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Validates that this is a well-formed JSON-RPC 2.0 request.
    ///
    /// Returns an error message if validation fails.
    #[must_use]
    pub fn validate(&self) -> Option<&'static str> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Some("jsonrpc field must be \"2.0\"");
        }
        None
    }

    /// Converts an already-parsed JSON value into a request.
    ///
    /// # Errors
    ///
    /// Returns an Invalid Request response if the value is not a request
    /// object. The id is recovered when it is a valid string or integer.
    pub fn from_value(value: Value) -> Result<Self, JsonRpcResponse> {
        if !value.is_object() {
            return Err(JsonRpcResponse::invalid_request(
                None,
                "request must be a JSON object",
            ));
        }

        let id = value
            .get("id")
            .and_then(|id| RequestId::deserialize(id).ok());

        let request: Self = serde_json::from_value(value)
            .map_err(|e| JsonRpcResponse::invalid_request(id, e.to_string()))?;

        if let Some(reason) = request.validate() {
            return Err(JsonRpcResponse::invalid_request(request.id, reason));
        }

        Ok(request)
    }
}

/// Standard JSON-RPC 2.0 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received by the server.
    ParseError,
    /// The JSON sent is not a valid Request object.
    InvalidRequest,
    /// The method does not exist or is not available.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal JSON-RPC error.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    /// Returns the default message for this error code.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcErrorData {
    /// The error code.
    pub code: i32,

    /// A short description of the error.
    pub message: String,

    /// Additional information about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorData {
    /// Creates a new error from an error code.
    #[must_use]
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.default_message().to_string(),
            data: None,
        }
    }

    /// Creates a new error with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Adds additional data to the error.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// The payload of a response: a result or an error, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The method succeeded.
    Result(Value),
    /// The method failed.
    Error(JsonRpcErrorData),
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this response corresponds to (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,

    /// Serialised inline as either `result` or `error`.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl JsonRpcResponse {
    /// Creates a new success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    /// Creates a new error response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JsonRpcErrorData contains String
    pub fn failure(id: Option<RequestId>, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(error),
        }
    }

    /// Creates a parse error response (ID cannot be determined).
    ///
    /// `detail` is the decoder's message and is carried in `error.data`.
    #[must_use]
    pub fn parse_error(detail: impl Into<String>) -> Self {
        Self::failure(
            None,
            JsonRpcErrorData::from_code(ErrorCode::ParseError)
                .with_data(Value::String(detail.into())),
        )
    }

    /// Creates an invalid request error response.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>, detail: impl Into<String>) -> Self {
        Self::failure(
            id,
            JsonRpcErrorData::from_code(ErrorCode::InvalidRequest)
                .with_data(Value::String(detail.into())),
        )
    }

    /// Creates a method not found error response.
    #[must_use]
    pub fn method_not_found(id: Option<RequestId>, method: &str) -> Self {
        Self::failure(
            id,
            JsonRpcErrorData::with_message(
                ErrorCode::MethodNotFound,
                format!("Method not found: {method}"),
            ),
        )
    }

    /// Creates an invalid params error response.
    #[must_use]
    pub fn invalid_params(id: Option<RequestId>, message: impl Into<String>) -> Self {
        Self::failure(
            id,
            JsonRpcErrorData::with_message(ErrorCode::InvalidParams, message),
        )
    }

    /// Creates an internal error response.
    #[must_use]
    pub fn internal_error(id: Option<RequestId>, message: impl Into<String>) -> Self {
        Self::failure(
            id,
            JsonRpcErrorData::with_message(ErrorCode::InternalError, message),
        )
    }

    /// Returns the result, if this is a success response.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Result(result) => Some(result),
            Outcome::Error(_) => None,
        }
    }

    /// Returns the error, if this is an error response.
    #[must_use]
    pub const fn error(&self) -> Option<&JsonRpcErrorData> {
        match &self.outcome {
            Outcome::Result(_) => None,
            Outcome::Error(error) => Some(error),
        }
    }
}

/// Parses raw bytes as JSON.
///
/// # Errors
///
/// Returns a Parse Error response if the bytes are not valid JSON.
pub fn parse_json(bytes: &[u8]) -> Result<Value, JsonRpcResponse> {
    serde_json::from_slice(bytes).map_err(|e| JsonRpcResponse::parse_error(e.to_string()))
}

/// Parses a JSON string into a request.
///
/// # Errors
///
/// Returns a Parse Error response if the text is not JSON, or an Invalid
/// Request response if it is JSON but not a request object.
pub fn parse_message(json: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    parse_json(json.as_bytes()).and_then(JsonRpcRequest::from_value)
}
