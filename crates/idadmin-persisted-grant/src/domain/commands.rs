//! Commands for the persisted grant context.

use idadmin_core::command::Command;
use idadmin_core::validation::{ValidationResult, Validator, checks};
use uuid::Uuid;

/// Command to revoke a persisted grant.
#[derive(Debug, Clone)]
pub struct RemovePersistedGrant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The grant to revoke.
    pub key: String,
}

impl Command for RemovePersistedGrant {
    fn command_type(&self) -> &'static str {
        "persisted_grant.remove"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("Key", "Please ensure you have entered the grant key", |c: &Self| {
                checks::not_blank(&c.key)
            })
            .validate(self)
    }
}
