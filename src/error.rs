//! Error types for xai-mcp-server.
//!
//! # Security Note
//!
//! Error messages are carefully crafted to NEVER include the API key.
//! Configuration errors name the offending variable, not its value.

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
///
/// All of these are fatal: the process exits before any transport is opened.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The xAI API key was not provided.
    #[error(
        "XAI_API_KEY environment variable is required. Get your API key from https://console.x.ai"
    )]
    MissingApiKey,

    /// The HTTP port could not be parsed.
    #[error("invalid PORT value '{value}'")]
    InvalidPort {
        /// The raw value that failed to parse.
        value: String,
        /// The underlying parse error.
        #[source]
        source: std::num::ParseIntError,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised by the xAI answer-engine client.
///
/// The tool adapter turns every one of these into a soft tool error, so the
/// display text is what an MCP host ends up showing to the user.
#[derive(Error, Debug)]
pub enum XaiError {
    /// The request never produced an HTTP response, or the body could not be read.
    #[error("XAI request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("XAI API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// The response has no output item of type `message`.
    #[error("No message content in XAI response")]
    NoMessageContent,

    /// The message item has no content item of type `output_text`.
    #[error("No text content in XAI response")]
    NoTextContent,

    /// The response body is not the JSON shape the Responses API documents.
    #[error("Malformed XAI response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}
