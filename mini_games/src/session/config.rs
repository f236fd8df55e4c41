use std::time::Duration;

use crate::config::{ConfigError, parse_env_or, parse_value};
use crate::game::constants::DEFAULT_IDLE_TIMEOUT_SECS;

/// Session registry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Seconds after creation before an unfinished session is dropped
    pub idle_timeout_secs: u64,
    /// Fixed seed for every session's dice, decks and coins. Only meant for
    /// reproducing games; unset means OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            rng_seed: None,
        }
    }
}

impl SessionConfig {
    /// Reads `SESSION_IDLE_TIMEOUT_SECS` and `SESSION_RNG_SEED`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let rng_seed = match std::env::var("SESSION_RNG_SEED") {
            Ok(value) => Some(parse_value("SESSION_RNG_SEED", &value)?),
            Err(_) => None,
        };
        let config = Self {
            idle_timeout_secs: parse_env_or("SESSION_IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT_SECS)?,
            rng_seed,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.idle_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "SESSION_IDLE_TIMEOUT_SECS",
                "Must be greater than 0",
            ));
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}
