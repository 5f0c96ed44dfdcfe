//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No session is stored under the given id.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// A user-facing validation failure (e.g. a session with no players).
    #[error("validation error: {0}")]
    Validation(String),

    /// A persisted blob could not be parsed or is not a valid session.
    #[error("corrupt session {session_id}: {reason}")]
    CorruptSession {
        /// The session id the blob was stored under.
        session_id: String,
        /// What was wrong with the blob.
        reason: String,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
