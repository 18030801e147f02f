//! Transport bindings for the MCP server.
//!
//! Both transports do the same thing, receive a frame, call the
//! [`Dispatcher`], emit a frame, and differ only in session model:
//!
//! - [`StdioTransport`]: one long-lived session over stdin/stdout
//! - [`HttpTransport`]: one stateless request/response per call

pub mod http;
pub mod stdio;

use std::io;
use std::sync::Arc;

use async_trait::async_trait;

use crate::mcp::dispatcher::Dispatcher;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

/// A front-end that feeds frames to a dispatcher until shut down.
#[async_trait]
pub trait Transport: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Serves requests until the peer disconnects or a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    async fn serve(self: Box<Self>, dispatcher: Arc<Dispatcher>) -> io::Result<()>;
}

/// Resolves when the process receives SIGINT/SIGTERM (Ctrl+C on Windows).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, initiating graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
