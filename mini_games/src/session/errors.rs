//! Session error types.

use thiserror::Error;

use super::models::SessionId;
use crate::game::ActionError;

/// Session errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The session finished or expired. Expected whenever a late button
    /// press or message arrives.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The action was rejected; the session is unchanged
    #[error("invalid action: {0}")]
    InvalidAction(#[from] ActionError),
}

impl SessionError {
    /// Message suitable for showing to the player who acted.
    pub fn client_message(&self) -> String {
        match self {
            SessionError::SessionNotFound(_) => "game already over".to_string(),
            SessionError::InvalidAction(err) => err.to_string(),
        }
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
