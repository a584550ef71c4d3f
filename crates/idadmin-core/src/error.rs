//! Domain error types.

use thiserror::Error;

/// Errors raised by repositories and other infrastructure collaborators.
///
/// Expected business failures never use this type; they travel as
/// notifications. A `DomainError` reaching the pipeline ends the command
/// with a failed outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A parent aggregate addressed by a child operation does not exist.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
