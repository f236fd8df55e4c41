//! Statistics store error types.

use std::time::Duration;
use thiserror::Error;

use crate::db::timeouts::TimeoutError;
use crate::game::entities::UnknownGameType;

/// Statistics errors
#[derive(Debug, Error)]
pub enum StatsError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query didn't finish in time
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// A stored game type that this build doesn't know about
    #[error("Corrupt statistics row: {0}")]
    UnknownGameType(#[from] UnknownGameType),
}

impl StatsError {
    /// Get a client-safe error message that doesn't leak storage details.
    pub fn client_message(&self) -> String {
        match self {
            StatsError::Database(_) | StatsError::Timeout(_) => "Internal server error".to_string(),
            StatsError::UnknownGameType(_) => "Statistics unavailable".to_string(),
        }
    }
}

impl From<TimeoutError> for StatsError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(after) => StatsError::Timeout(after),
            TimeoutError::Database(err) => StatsError::Database(err),
        }
    }
}

/// Result type for statistics operations
pub type StatsResult<T> = Result<T, StatsError>;
