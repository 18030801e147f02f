//! Stateless HTTP transport.
//!
//! | Route          | Purpose                                   |
//! |----------------|-------------------------------------------|
//! | `GET /`        | Server metadata and endpoint directory    |
//! | `GET /health`  | Liveness with server identity and uptime  |
//! | `POST /mcp`    | One JSON-RPC request in, one response out |
//!
//! A `POST /mcp` body that is not valid JSON never reaches the dispatcher:
//! it is answered with a Parse Error and HTTP 500.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::protocol::{parse_json, JsonRpcRequest};
use crate::mcp::transport::{shutdown_signal, Transport};

/// Longest params preview written to the request log.
const PARAMS_PREVIEW_CHARS: usize = 100;

/// Shared state handed to every route.
#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    started_at: Instant,
}

/// HTTP front-end for the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct HttpTransport {
    addr: SocketAddr,
}

impl HttpTransport {
    /// Creates a transport listening on all interfaces at `port`.
    #[must_use]
    pub fn new(port: u16) -> Self {
        Self::with_addr(SocketAddr::from(([0, 0, 0, 0], port)))
    }

    /// Creates a transport listening on `addr`.
    #[must_use]
    pub const fn with_addr(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Returns the address the transport binds to.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Builds the router. Uptime is measured from this call.
    pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
        let state = AppState {
            dispatcher,
            started_at: Instant::now(),
        };

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route("/mcp", post(mcp_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn serve(self: Box<Self>, dispatcher: Arc<Dispatcher>) -> io::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        let port = self.addr.port();

        info!(addr = %self.addr, "HTTP server listening");
        info!("MCP endpoint: http://localhost:{port}/mcp");
        info!("Health check: http://localhost:{port}/health");

        axum::serve(listener, Self::router(dispatcher))
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// Server metadata and endpoint directory.
async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "XAI MCP Server",
        "version": state.dispatcher.server_info().version,
        "description": "Model Context Protocol server for XAI x_search tool",
        "endpoints": {
            "health": "/health",
            "mcp": "/mcp (POST)",
        },
    }))
}

/// Health check endpoint.
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let info = state.dispatcher.server_info();
    Json(json!({
        "status": "healthy",
        "server": info.name,
        "version": info.version,
        "uptime": state.started_at.elapsed().as_secs_f64(),
    }))
}

/// JSON-RPC endpoint.
async fn mcp_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let value = match parse_json(&body) {
        Ok(value) => value,
        Err(response) => {
            warn!(len = body.len(), "Rejected request body that is not JSON");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
    };

    let request = match JsonRpcRequest::from_value(value) {
        Ok(request) => request,
        Err(response) => return Json(response).into_response(),
    };

    info!(method = %request.method, "MCP request");
    if let Some(params) = &request.params {
        let preview: String = params.to_string().chars().take(PARAMS_PREVIEW_CHARS).collect();
        debug!(params = %preview, "MCP request params");
    }

    let response = state.dispatcher.handle(request).await;
    Json(response).into_response()
}
