//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No playback session exists for the given link.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Input failed validation (malformed sequence, bad layout, bad link).
    #[error("validation error: {0}")]
    Validation(String),

    /// A collaborator (HTTP source, progress store) failed.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
