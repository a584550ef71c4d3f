//! Commands for the identity resource context.

use idadmin_core::command::Command;
use idadmin_core::validation::{ValidationResult, Validator, checks};
use uuid::Uuid;

use crate::domain::aggregates::IdentityResource;

fn resource_rules() -> Validator<IdentityResource> {
    Validator::new()
        .rule("Name", "Please ensure you have entered the resource name", |r: &IdentityResource| {
            checks::not_blank(&r.name)
        })
        .rule("Name", "Resource name must not contain whitespace", |r: &IdentityResource| {
            !checks::not_blank(&r.name) || checks::is_name(&r.name)
        })
        .rule("UserClaims", "An identity resource needs at least one claim", |r: &IdentityResource| {
            !r.user_claims.is_empty()
        })
        .rule("UserClaims", "Claim types must not be blank", |r: &IdentityResource| {
            checks::no_blank_entries(&r.user_claims)
        })
        .rule("UserClaims", "Claim types must be distinct", |r: &IdentityResource| {
            checks::distinct(&r.user_claims)
        })
}

/// Command to register a new identity resource.
#[derive(Debug, Clone)]
pub struct RegisterIdentityResource {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The resource to create.
    pub resource: IdentityResource,
}

impl Command for RegisterIdentityResource {
    fn command_type(&self) -> &'static str {
        "identity_resource.register"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        resource_rules().validate(&self.resource)
    }
}

/// Command to replace an identity resource, possibly renaming it.
#[derive(Debug, Clone)]
pub struct UpdateIdentityResource {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The name the resource is currently stored under.
    pub old_name: String,
    /// The new state.
    pub resource: IdentityResource,
}

impl Command for UpdateIdentityResource {
    fn command_type(&self) -> &'static str {
        "identity_resource.update"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("OldName", "Please ensure you have entered the current resource name", |c: &Self| {
                checks::not_blank(&c.old_name)
            })
            .validate(self)
            .and(resource_rules().validate(&self.resource))
    }
}

/// Command to remove an identity resource.
#[derive(Debug, Clone)]
pub struct RemoveIdentityResource {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The resource to remove.
    pub name: String,
}

impl Command for RemoveIdentityResource {
    fn command_type(&self) -> &'static str {
        "identity_resource.remove"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("Name", "Please ensure you have entered the resource name", |c: &Self| {
                checks::not_blank(&c.name)
            })
            .validate(self)
    }
}
