//! Commands for the API resource context.

use idadmin_core::command::Command;
use idadmin_core::secret::NewSecret;
use idadmin_core::validation::{ValidationResult, Validator, checks};
use uuid::Uuid;

use crate::domain::aggregates::{ApiResourceFields, ApiScope};

const NAME_MAX_LEN: usize = 200;

/// Rules shared by every command that writes the top-level resource fields.
fn resource_rules() -> Validator<ApiResourceFields> {
    Validator::new()
        .rule("Name", "Please ensure you have entered the Api name", |r: &ApiResourceFields| {
            checks::not_blank(&r.name)
        })
        .rule("Name", "Api name must not contain whitespace", |r: &ApiResourceFields| {
            !checks::not_blank(&r.name) || checks::is_name(&r.name)
        })
        .rule("Name", "Api name must be at most 200 characters", |r: &ApiResourceFields| {
            checks::max_len(&r.name, NAME_MAX_LEN)
        })
        .rule("UserClaims", "Claim types must not be blank", |r: &ApiResourceFields| {
            checks::no_blank_entries(&r.user_claims)
        })
        .rule("UserClaims", "Claim types must be distinct", |r: &ApiResourceFields| {
            checks::distinct(&r.user_claims)
        })
}

/// Command to register a new API resource.
#[derive(Debug, Clone)]
pub struct RegisterApiResource {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The resource to create.
    pub resource: ApiResourceFields,
}

impl Command for RegisterApiResource {
    fn command_type(&self) -> &'static str {
        "api_resource.register"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        resource_rules().validate(&self.resource)
    }
}

/// Command to replace the top-level fields of an API resource, possibly
/// renaming it.
#[derive(Debug, Clone)]
pub struct UpdateApiResource {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The name the resource is currently stored under.
    pub old_name: String,
    /// The new field values.
    pub resource: ApiResourceFields,
}

impl Command for UpdateApiResource {
    fn command_type(&self) -> &'static str {
        "api_resource.update"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("OldName", "Please ensure you have entered the current Api name", |c: &Self| {
                checks::not_blank(&c.old_name)
            })
            .validate(self)
            .and(resource_rules().validate(&self.resource))
    }
}

/// Command to remove an API resource with all its secrets and scopes.
#[derive(Debug, Clone)]
pub struct RemoveApiResource {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The resource to remove.
    pub name: String,
}

impl Command for RemoveApiResource {
    fn command_type(&self) -> &'static str {
        "api_resource.remove"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("Name", "Please ensure you have entered the Api name", |c: &Self| {
                checks::not_blank(&c.name)
            })
            .validate(self)
    }
}

/// Command to add a secret to an API resource.
#[derive(Debug, Clone)]
pub struct SaveApiSecret {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning resource.
    pub resource_name: String,
    /// The secret as entered; hashed before it is stored.
    pub secret: NewSecret,
}

impl Command for SaveApiSecret {
    fn command_type(&self) -> &'static str {
        "api_resource.save_secret"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ResourceName", "Please ensure you have entered the Api name", |c: &Self| {
                checks::not_blank(&c.resource_name)
            })
            .rule("Type", "Please ensure you have entered the secret type", |c: &Self| {
                checks::not_blank(&c.secret.secret_type)
            })
            .rule("Value", "Please ensure you have entered the secret value", |c: &Self| {
                checks::not_blank(&c.secret.value)
            })
            .validate(self)
    }
}

/// Command to remove one secret from an API resource.
///
/// `value` is the stored value, i.e. the digest for hashed secrets.
#[derive(Debug, Clone)]
pub struct RemoveApiSecret {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning resource.
    pub resource_name: String,
    /// Secret discriminator.
    pub secret_type: String,
    /// Stored secret value.
    pub value: String,
}

impl Command for RemoveApiSecret {
    fn command_type(&self) -> &'static str {
        "api_resource.remove_secret"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ResourceName", "Please ensure you have entered the Api name", |c: &Self| {
                checks::not_blank(&c.resource_name)
            })
            .rule("Type", "Please ensure you have entered the secret type", |c: &Self| {
                checks::not_blank(&c.secret_type)
            })
            .rule("Value", "Please ensure you have entered the secret value", |c: &Self| {
                checks::not_blank(&c.value)
            })
            .validate(self)
    }
}

/// Command to add a scope to an API resource.
#[derive(Debug, Clone)]
pub struct SaveApiScope {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning resource.
    pub resource_name: String,
    /// The scope to add.
    pub scope: ApiScope,
}

impl Command for SaveApiScope {
    fn command_type(&self) -> &'static str {
        "api_resource.save_scope"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ResourceName", "Please ensure you have entered the Api name", |c: &Self| {
                checks::not_blank(&c.resource_name)
            })
            .rule("Name", "Please ensure you have entered the scope name", |c: &Self| {
                checks::not_blank(&c.scope.name)
            })
            .rule("Name", "Scope name must not contain whitespace", |c: &Self| {
                !checks::not_blank(&c.scope.name) || checks::is_name(&c.scope.name)
            })
            .rule("UserClaims", "Claim types must not be blank", |c: &Self| {
                checks::no_blank_entries(&c.scope.user_claims)
            })
            .validate(self)
    }
}

/// Command to remove one scope from an API resource.
#[derive(Debug, Clone)]
pub struct RemoveApiScope {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning resource.
    pub resource_name: String,
    /// The scope to remove.
    pub name: String,
}

impl Command for RemoveApiScope {
    fn command_type(&self) -> &'static str {
        "api_resource.remove_scope"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ResourceName", "Please ensure you have entered the Api name", |c: &Self| {
                checks::not_blank(&c.resource_name)
            })
            .rule("Name", "Please ensure you have entered the scope name", |c: &Self| {
                checks::not_blank(&c.name)
            })
            .validate(self)
    }
}

#[cfg(test)]
mod tests {
    use idadmin_core::secret::{HashType, SHARED_SECRET};

    use super::*;

    fn fields(name: &str) -> ApiResourceFields {
        ApiResourceFields {
            name: name.to_owned(),
            display_name: None,
            description: None,
            enabled: true,
            user_claims: Vec::new(),
        }
    }

    fn failed_fields(result: &ValidationResult) -> Vec<&'static str> {
        result.errors().iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_register_requires_name() {
        let command = RegisterApiResource {
            correlation_id: Uuid::new_v4(),
            resource: fields(""),
        };

        let result = command.validate();

        assert_eq!(failed_fields(&result), vec!["Name"]);
    }

    #[test]
    fn test_register_rejects_whitespace_and_duplicate_claims() {
        let mut resource = fields("payments api");
        resource.user_claims = vec!["email".to_owned(), "email".to_owned()];
        let command = RegisterApiResource {
            correlation_id: Uuid::new_v4(),
            resource,
        };

        let result = command.validate();

        assert_eq!(failed_fields(&result), vec!["Name", "UserClaims"]);
    }

    #[test]
    fn test_update_reports_old_name_before_resource_fields() {
        let command = UpdateApiResource {
            correlation_id: Uuid::new_v4(),
            old_name: " ".to_owned(),
            resource: fields(""),
        };

        let result = command.validate();

        assert_eq!(failed_fields(&result), vec!["OldName", "Name"]);
    }

    #[test]
    fn test_save_secret_requires_value() {
        let command = SaveApiSecret {
            correlation_id: Uuid::new_v4(),
            resource_name: "payments-api".to_owned(),
            secret: NewSecret {
                secret_type: SHARED_SECRET.to_owned(),
                value: String::new(),
                description: None,
                expiration: None,
                hash_type: HashType::Sha256,
            },
        };

        let result = command.validate();

        assert_eq!(failed_fields(&result), vec!["Value"]);
    }

    #[test]
    fn test_valid_remove_scope_has_no_errors() {
        let command = RemoveApiScope {
            correlation_id: Uuid::new_v4(),
            resource_name: "payments-api".to_owned(),
            name: "payments.read".to_owned(),
        };

        assert!(command.validate().is_valid());
    }
}
