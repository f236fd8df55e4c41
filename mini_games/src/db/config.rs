//! Database configuration module.
//!
//! Provides configuration structures for database connection management.

use crate::config::{ConfigError, parse_env_or};

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Create configuration for `database_url`, reading pool settings from
    /// environment variables
    ///
    /// Expected environment variables:
    /// - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 10)
    /// - `DB_MIN_CONNECTIONS`: Minimum pool size (default: 1)
    /// - `DB_CONNECTION_TIMEOUT_SECS`: Connection timeout in seconds (default: 5)
    /// - `DB_IDLE_TIMEOUT_SECS`: Idle timeout in seconds (default: 300)
    /// - `DB_MAX_LIFETIME_SECS`: Max lifetime in seconds (default: 1800)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but malformed, or
    /// if the pool bounds are inconsistent.
    pub fn from_env(database_url: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            database_url: database_url.into(),
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", 10)?,
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", 1)?,
            connection_timeout_secs: parse_env_or("DB_CONNECTION_TIMEOUT_SECS", 5)?,
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", 300)?,
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", 1800)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::invalid(
                "DB_MAX_CONNECTIONS",
                "Must be greater than 0",
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::invalid(
                "DB_MIN_CONNECTIONS",
                format!("Can't exceed max connections ({})", self.max_connections),
            ));
        }
        Ok(())
    }

    /// Create a default configuration for development
    ///
    /// Uses `postgres://postgres@localhost/minigames` as the database URL
    pub fn development() -> Self {
        Self {
            database_url: "postgres://postgres@localhost/minigames".to_string(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}
