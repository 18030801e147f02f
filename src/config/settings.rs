//! Configuration structures.
//!
//! These are built once at startup and never mutated afterwards.

use crate::error::ConfigError;

/// Default Grok model used for searches.
pub const DEFAULT_MODEL: &str = "grok-4-1-fast";

/// Default base URL of the xAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Log levels accepted in `LOG_LEVEL`.
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// xAI client settings.
    pub xai: XaiConfig,

    /// Port the HTTP transport binds to.
    pub port: u16,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the log level is unknown.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.xai.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let level = self.logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

/// Static credentials and endpoint for the xAI Responses API.
///
/// Passed by reference into [`crate::xai::XaiClient::new`].
#[derive(Clone, PartialEq, Eq)]
pub struct XaiConfig {
    /// Bearer token for the API.
    pub api_key: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// API base URL, without the trailing `/responses`.
    pub base_url: String,
}

impl XaiConfig {
    /// Creates a config for `api_key` with the default model and base URL.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

// Hand-written so the key never reaches a log line.
impl std::fmt::Debug for XaiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XaiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}
