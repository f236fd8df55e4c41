//! Timeout wrappers for statistics queries.
//!
//! A stalled database must never hold up the caller that reports a finished
//! game, so every query goes through one of these.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Single statement
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Multi-statement transaction
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum TimeoutError {
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type TimeoutResult<T> = Result<T, TimeoutError>;

/// Runs `future`, giving up after `duration`.
///
/// ```no_run
/// use mini_games::db::timeouts::{with_timeout, DEFAULT_QUERY_TIMEOUT};
/// # use sqlx::PgPool;
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// with_timeout(
///     DEFAULT_QUERY_TIMEOUT,
///     sqlx::query("SELECT points FROM players WHERE user_id = $1")
///         .bind(1_i64)
///         .fetch_optional(pool),
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> TimeoutResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(duration, future).await {
        Ok(result) => result.map_err(TimeoutError::Database),
        Err(_) => Err(TimeoutError::Timeout(duration)),
    }
}

pub async fn with_default_timeout<F, T>(future: F) -> TimeoutResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    with_timeout(DEFAULT_QUERY_TIMEOUT, future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_stalled_future_times_out() {
        let stalled = std::future::pending::<Result<(), sqlx::Error>>();
        let err = with_timeout(Duration::from_secs(2), stalled)
            .await
            .unwrap_err();
        assert!(matches!(err, TimeoutError::Timeout(d) if d == Duration::from_secs(2)));
        assert!(err.to_string().contains("2s"));
    }

    #[tokio::test]
    async fn test_database_error_passes_through() {
        let failing = async { Err::<(), _>(sqlx::Error::RowNotFound) };
        let err = with_default_timeout(failing).await.unwrap_err();
        assert!(matches!(err, TimeoutError::Database(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn test_ready_future_passes_value() {
        let ready = async { Ok::<_, sqlx::Error>(3) };
        assert_eq!(with_default_timeout(ready).await.unwrap(), 3);
    }
}
