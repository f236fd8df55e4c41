//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use mini_games::config::{ConfigError, parse_value};
use mini_games::db::DatabaseConfig;
use mini_games::session::SessionConfig;
use std::net::SocketAddr;

const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP bind address
    pub bind: SocketAddr,
    /// Prometheus exporter address; metrics are off when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Statistics database; `None` keeps statistics in memory
    pub database: Option<DatabaseConfig>,
    /// Session registry settings
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `metrics_bind_override` - Optional metrics address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to something unparsable or the
    /// resulting configuration is inconsistent
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        metrics_bind_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => {
                let value = std::env::var("SERVER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
                parse_value("SERVER_BIND", &value)?
            }
        };

        let metrics_bind = match metrics_bind_override {
            Some(addr) => Some(addr),
            None => std::env::var("METRICS_BIND")
                .ok()
                .map(|value| parse_value("METRICS_BIND", &value))
                .transpose()?,
        };

        let database = database_url_override
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .filter(|url| !url.trim().is_empty())
            .map(DatabaseConfig::from_env)
            .transpose()?;

        let config = ServerConfig {
            bind,
            metrics_bind,
            database,
            session: SessionConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::invalid(
                "METRICS_BIND",
                format!("Must differ from the server address ({})", self.bind),
            ));
        }
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.session.validate()
    }
}
