//! Outbox error types.

use thiserror::Error;

/// Outbox error type.
#[derive(Error, Debug)]
pub enum OutboxError {
    /// The number has no digits to dial.
    #[error("Invalid mobile number: {0:?}")]
    InvalidNumber(String),

    /// The link could not be handed to a handler.
    #[error("Failed to open link: {0}")]
    Open(String),

    /// Max retries exceeded
    #[error("Max retries exceeded for notification {0}")]
    MaxRetriesExceeded(String),

    /// The worker has shut down.
    #[error("Outbox queue closed")]
    Closed,
}

/// Result type alias using OutboxError.
pub type OutboxResult<T> = Result<T, OutboxError>;
