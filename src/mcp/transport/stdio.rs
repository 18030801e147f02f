//! stdio transport for MCP server.
//!
//! This module implements the stdio transport as specified by MCP:
//!
//! - Messages are UTF-8 encoded JSON-RPC
//! - Messages are delimited by newlines
//! - Messages must not contain embedded newlines
//! - stdin: receives messages from client
//! - stdout: sends messages to client
//! - stderr: may be used for logging (not MCP messages)
//!
//! Responses to notifications (requests without an `id`) are not written.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::protocol::{parse_json, JsonRpcRequest, JsonRpcResponse};
use crate::mcp::transport::{shutdown_signal, Transport};

/// A stdio-based MCP transport.
///
/// Reads JSON-RPC messages line by line and writes one response line per
/// request. Generic over the streams so sessions can be driven in memory.
pub struct StdioTransport<R = BufReader<tokio::io::Stdin>, W = tokio::io::Stdout> {
    /// Buffered reader for incoming frames.
    reader: R,
    /// Sink for outgoing frames.
    writer: W,
}

impl StdioTransport {
    /// Creates a transport over the process's stdin and stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a transport over arbitrary streams.
    #[must_use]
    pub const fn with_io(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Consumes the transport, returning the underlying streams.
    #[must_use]
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Reads the next message line as raw bytes.
    ///
    /// Returns `None` if the input is closed (EOF). Bytes are not checked for
    /// UTF-8 here; a bad frame is reported by the parser, not as an I/O error.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let bytes_read = self.reader.read_until(b'\n', &mut line).await?;

        if bytes_read == 0 {
            return Ok(None);
        }

        // Remove the trailing newline
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }

    /// Writes a JSON-RPC response, terminated with a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.write_raw(&json).await
    }

    /// Writes a raw JSON string with newline termination.
    async fn write_raw(&mut self, json: &str) -> io::Result<()> {
        // MCP spec: messages must not contain embedded newlines
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }

    /// Runs the session until the input reaches EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self, dispatcher: &Dispatcher) -> io::Result<()> {
        while let Some(line) = self.read_line().await? {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            if let Some(response) = Self::handle_line(dispatcher, &line).await {
                self.write_response(&response).await?;
            }
        }

        debug!("stdin closed, ending session");
        Ok(())
    }

    /// Handles a single line of input, returning the frame to write back.
    async fn handle_line(dispatcher: &Dispatcher, line: &[u8]) -> Option<JsonRpcResponse> {
        match parse_json(line).and_then(JsonRpcRequest::from_value) {
            Ok(request) => {
                let notification = request.is_notification();
                let response = dispatcher.handle(request).await;
                (!notification).then_some(response)
            }
            Err(error) => {
                debug!("Rejected malformed frame");
                Some(error)
            }
        }
    }
}

#[async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn name(&self) -> &'static str {
        "stdio"
    }

    async fn serve(mut self: Box<Self>, dispatcher: Arc<Dispatcher>) -> io::Result<()> {
        info!("MCP server ready on stdio, waiting for client connection...");

        tokio::select! {
            result = self.run(&dispatcher) => result,
            () = shutdown_signal() => Ok(()),
        }
    }
}
