//! Commands for the client context.

use idadmin_core::command::Command;
use idadmin_core::secret::NewSecret;
use idadmin_core::validation::{ValidationResult, Validator, checks};
use uuid::Uuid;

use crate::domain::aggregates::{
    ClientClaim, ClientProperty, ClientSettings, ClientType, grant_combination_is_valid,
};

fn optional_uri(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.is_empty() || checks::is_absolute_uri(v))
}

/// Rules shared by every command that writes client settings.
fn settings_rules() -> Validator<ClientSettings> {
    Validator::new()
        .rule("ClientId", "Please ensure you have entered the client id", |s: &ClientSettings| {
            checks::not_blank(&s.client_id)
        })
        .rule("ClientId", "Client id must not contain whitespace", |s: &ClientSettings| {
            !checks::not_blank(&s.client_id) || checks::is_name(&s.client_id)
        })
        .rule("ClientName", "Please ensure you have entered the client name", |s: &ClientSettings| {
            checks::not_blank(&s.client_name)
        })
        .rule("ClientUri", "Client uri must be an absolute url", |s: &ClientSettings| {
            optional_uri(s.client_uri.as_deref())
        })
        .rule("LogoUri", "Logo uri must be an absolute url", |s: &ClientSettings| {
            optional_uri(s.logo_uri.as_deref())
        })
        .rule("AllowedGrantTypes", "Grant types must not be blank", |s: &ClientSettings| {
            checks::no_blank_entries(&s.allowed_grant_types)
        })
        .rule("AllowedGrantTypes", "Grant types must be distinct", |s: &ClientSettings| {
            checks::distinct(&s.allowed_grant_types)
        })
        .rule(
            "AllowedGrantTypes",
            "Implicit, hybrid and authorization code flows cannot be combined",
            |s: &ClientSettings| grant_combination_is_valid(&s.allowed_grant_types),
        )
        .rule("RedirectUris", "Redirect uris must be absolute urls", |s: &ClientSettings| {
            checks::all_absolute_uris(&s.redirect_uris)
        })
        .rule(
            "PostLogoutRedirectUris",
            "Post logout redirect uris must be absolute urls",
            |s: &ClientSettings| checks::all_absolute_uris(&s.post_logout_redirect_uris),
        )
        .rule("AllowedCorsOrigins", "Cors origins must be absolute urls", |s: &ClientSettings| {
            checks::all_absolute_uris(&s.allowed_cors_origins)
        })
        .rule("AllowedScopes", "Scopes must not be blank", |s: &ClientSettings| {
            checks::no_blank_entries(&s.allowed_scopes)
        })
        .rule("AccessTokenLifetime", "Token lifetimes must be positive", |s: &ClientSettings| {
            s.access_token_lifetime > 0
                && s.identity_token_lifetime > 0
                && s.authorization_code_lifetime > 0
        })
}

/// Command to save a new client from a type preset.
#[derive(Debug, Clone)]
pub struct SaveClient {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The settings as entered.
    pub client: ClientSettings,
    /// The preset applied before the client is stored.
    pub client_type: ClientType,
}

impl SaveClient {
    /// The settings that will be stored, preset applied.
    #[must_use]
    pub fn settings(&self) -> ClientSettings {
        self.client_type.apply(self.client.clone())
    }
}

impl Command for SaveClient {
    fn command_type(&self) -> &'static str {
        "client.save"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        settings_rules().validate(&self.settings())
    }
}

/// Command to replace a client's settings, possibly renaming it.
#[derive(Debug, Clone)]
pub struct UpdateClient {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The id the client is currently stored under.
    pub old_client_id: String,
    /// The new settings.
    pub client: ClientSettings,
}

impl Command for UpdateClient {
    fn command_type(&self) -> &'static str {
        "client.update"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("OldClientId", "Please ensure you have entered the current client id", |c: &Self| {
                checks::not_blank(&c.old_client_id)
            })
            .validate(self)
            .and(settings_rules().validate(&self.client))
    }
}

/// Command to remove a client with all its children.
#[derive(Debug, Clone)]
pub struct RemoveClient {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The client to remove.
    pub client_id: String,
}

impl Command for RemoveClient {
    fn command_type(&self) -> &'static str {
        "client.remove"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ClientId", "Please ensure you have entered the client id", |c: &Self| {
                checks::not_blank(&c.client_id)
            })
            .validate(self)
    }
}

/// Command to duplicate a client under `copy-of-<client_id>`.
#[derive(Debug, Clone)]
pub struct CopyClient {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The client to copy.
    pub client_id: String,
}

impl Command for CopyClient {
    fn command_type(&self) -> &'static str {
        "client.copy"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ClientId", "Please ensure you have entered the client id", |c: &Self| {
                checks::not_blank(&c.client_id)
            })
            .validate(self)
    }
}

/// Command to add a secret to a client.
#[derive(Debug, Clone)]
pub struct SaveClientSecret {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning client.
    pub client_id: String,
    /// The secret as entered; hashed before it is stored.
    pub secret: NewSecret,
}

impl Command for SaveClientSecret {
    fn command_type(&self) -> &'static str {
        "client.save_secret"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ClientId", "Please ensure you have entered the client id", |c: &Self| {
                checks::not_blank(&c.client_id)
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

/// Command to remove one secret from a client. `value` is the stored value.
#[derive(Debug, Clone)]
pub struct RemoveClientSecret {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning client.
    pub client_id: String,
    /// Secret discriminator.
    pub secret_type: String,
    /// Stored secret value.
    pub value: String,
}

impl Command for RemoveClientSecret {
    fn command_type(&self) -> &'static str {
        "client.remove_secret"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ClientId", "Please ensure you have entered the client id", |c: &Self| {
                checks::not_blank(&c.client_id)
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

/// Command to add a claim to a client.
#[derive(Debug, Clone)]
pub struct SaveClientClaim {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning client.
    pub client_id: String,
    /// The claim to add.
    pub claim: ClientClaim,
}

impl Command for SaveClientClaim {
    fn command_type(&self) -> &'static str {
        "client.save_claim"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ClientId", "Please ensure you have entered the client id", |c: &Self| {
                checks::not_blank(&c.client_id)
            })
            .rule("Type", "Please ensure you have entered the claim type", |c: &Self| {
                checks::not_blank(&c.claim.claim_type)
            })
            .rule("Value", "Please ensure you have entered the claim value", |c: &Self| {
                checks::not_blank(&c.claim.value)
            })
            .validate(self)
    }
}

/// Command to remove one claim from a client.
#[derive(Debug, Clone)]
pub struct RemoveClientClaim {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning client.
    pub client_id: String,
    /// Claim type.
    pub claim_type: String,
    /// Claim value.
    pub value: String,
}

impl Command for RemoveClientClaim {
    fn command_type(&self) -> &'static str {
        "client.remove_claim"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ClientId", "Please ensure you have entered the client id", |c: &Self| {
                checks::not_blank(&c.client_id)
            })
            .rule("Type", "Please ensure you have entered the claim type", |c: &Self| {
                checks::not_blank(&c.claim_type)
            })
            .rule("Value", "Please ensure you have entered the claim value", |c: &Self| {
                checks::not_blank(&c.value)
            })
            .validate(self)
    }
}

/// Command to add a property to a client.
#[derive(Debug, Clone)]
pub struct SaveClientProperty {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning client.
    pub client_id: String,
    /// The property to add.
    pub property: ClientProperty,
}

impl Command for SaveClientProperty {
    fn command_type(&self) -> &'static str {
        "client.save_property"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ClientId", "Please ensure you have entered the client id", |c: &Self| {
                checks::not_blank(&c.client_id)
            })
            .rule("Key", "Please ensure you have entered the property key", |c: &Self| {
                checks::not_blank(&c.property.key)
            })
            .rule("Value", "Please ensure you have entered the property value", |c: &Self| {
                checks::not_blank(&c.property.value)
            })
            .validate(self)
    }
}

/// Command to remove one property from a client.
#[derive(Debug, Clone)]
pub struct RemoveClientProperty {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The owning client.
    pub client_id: String,
    /// Property key.
    pub key: String,
    /// Property value.
    pub value: String,
}

impl Command for RemoveClientProperty {
    fn command_type(&self) -> &'static str {
        "client.remove_property"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> ValidationResult {
        Validator::new()
            .rule("ClientId", "Please ensure you have entered the client id", |c: &Self| {
                checks::not_blank(&c.client_id)
            })
            .rule("Key", "Please ensure you have entered the property key", |c: &Self| {
                checks::not_blank(&c.key)
            })
            .rule("Value", "Please ensure you have entered the property value", |c: &Self| {
                checks::not_blank(&c.value)
            })
            .validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::grant_types;

    fn settings(client_id: &str) -> ClientSettings {
        serde_json::from_value(serde_json::json!({
            "client_id": client_id,
            "client_name": "Shop front",
            "redirect_uris": ["https://shop.example.com/signin-oidc"],
        }))
        .unwrap()
    }

    fn fields_of(result: &ValidationResult) -> Vec<&'static str> {
        result.errors().iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_save_client_validates_settings_after_preset() {
        let mut client = settings("shop");
        client.allowed_grant_types = vec![grant_types::IMPLICIT.to_owned()];
        let command = SaveClient {
            correlation_id: Uuid::new_v4(),
            client,
            client_type: ClientType::Spa,
        };

        // The preset replaces the implicit grant, so the result is valid.
        assert!(command.validate().is_valid());
    }

    #[test]
    fn test_save_client_reports_every_broken_field() {
        let mut client = settings("");
        client.client_name = String::new();
        client.redirect_uris = vec!["/relative".to_owned()];
        client.allowed_grant_types = vec![
            grant_types::IMPLICIT.to_owned(),
            grant_types::HYBRID.to_owned(),
        ];
        let command = SaveClient {
            correlation_id: Uuid::new_v4(),
            client,
            client_type: ClientType::Empty,
        };

        let result = command.validate();

        assert_eq!(
            fields_of(&result),
            vec!["ClientId", "ClientName", "AllowedGrantTypes", "RedirectUris"]
        );
    }

    #[test]
    fn test_optional_uris_accept_absent_or_empty() {
        assert!(optional_uri(None));
        assert!(optional_uri(Some("")));
        assert!(optional_uri(Some("https://shop.example.com")));
        assert!(!optional_uri(Some("shop.example.com")));
    }

    #[test]
    fn test_remove_property_requires_key_and_value() {
        let command = RemoveClientProperty {
            correlation_id: Uuid::new_v4(),
            client_id: "shop".to_owned(),
            key: String::new(),
            value: String::new(),
        };

        assert_eq!(fields_of(&command.validate()), vec!["Key", "Value"]);
    }
}
