//! Configuration loading from the environment.
//!
//! # Environment Variables
//!
//! | Variable       | Required | Default               |
//! |----------------|----------|-----------------------|
//! | `XAI_API_KEY`  | yes      |                       |
//! | `XAI_MODEL`    | no       | `grok-4-1-fast`       |
//! | `XAI_BASE_URL` | no       | `https://api.x.ai/v1` |
//! | `PORT`         | no       | `3000`                |
//! | `LOG_LEVEL`    | no       | `info`                |
//!
//! Configuration is read once at startup. A missing API key is fatal.

mod settings;

pub use settings::{
    Config, LoggingConfig, XaiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_PORT,
};

use crate::error::ConfigError;

/// Loads and validates configuration from the process environment.
///
/// # Errors
///
/// Returns an error if:
/// - `XAI_API_KEY` is missing or blank
/// - `PORT` is not a valid port number
/// - `LOG_LEVEL` is not a known level
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Loads and validates configuration using `lookup` to resolve variables.
///
/// Empty values are treated as unset.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let mut xai = XaiConfig::new(get("XAI_API_KEY").unwrap_or_default());
    if let Some(model) = get("XAI_MODEL") {
        xai = xai.with_model(model);
    }
    if let Some(base_url) = get("XAI_BASE_URL") {
        xai = xai.with_base_url(base_url.trim_end_matches('/'));
    }

    let port = match get("PORT") {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|source| ConfigError::InvalidPort { value: raw, source })?,
        None => DEFAULT_PORT,
    };

    let logging = LoggingConfig {
        level: get("LOG_LEVEL").unwrap_or_else(settings::default_log_level),
    };

    let config = Config { xai, port, logging };

    config.validate()?;

    Ok(config)
}
