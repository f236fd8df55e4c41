//! Shared helpers for reading configuration from the environment.

use std::str::FromStr;

/// Configuration error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl ConfigError {
    pub fn invalid(var: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var: var.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parses `value` read from `key`, reporting which variable was malformed.
pub fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, format!("can't parse {value:?}")))
}

/// Reads `key` from the environment, falling back to `default` when unset.
///
/// A value that is set but can't be parsed is an error rather than a silent
/// fallback.
pub fn parse_env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => parse_value(key, &value),
        Err(_) => Ok(default),
    }
}
