//! Collaborative bingo board — runtime error types.

use bingo_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid, or tracing could not be set up.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or schema error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A session operation failed.
    #[error(transparent)]
    Domain(#[from] DomainError),
}
