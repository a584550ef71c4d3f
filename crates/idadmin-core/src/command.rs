//! Command abstractions.

use uuid::Uuid;

use crate::validation::ValidationResult;

/// Trait that all commands implement.
///
/// A command is an immutable request for one mutation. It is validated once
/// by the pipeline and consumed by exactly one handler invocation.
pub trait Command: Send + Sync + std::fmt::Debug + 'static {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// Evaluates the command's declared rules against its current fields.
    fn validate(&self) -> ValidationResult;
}
