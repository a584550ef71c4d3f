//! Aggregate roots for the API resource context.

use idadmin_core::secret::Secret;
use serde::{Deserialize, Serialize};

/// A protected API, addressed by its unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
    /// Natural key.
    pub name: String,
    /// Display name shown on consent screens.
    pub display_name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Disabled resources are not issued tokens for.
    pub enabled: bool,
    /// Claim types included in access tokens for this API.
    pub user_claims: Vec<String>,
    /// Secrets used for token introspection.
    pub secrets: Vec<Secret>,
    /// Scopes exposed by the API.
    pub scopes: Vec<ApiScope>,
}

impl ApiResource {
    /// `true` if a secret with exactly this type and stored value exists.
    #[must_use]
    pub fn has_secret(&self, secret_type: &str, value: &str) -> bool {
        self.secrets.iter().any(|s| s.matches(secret_type, value))
    }

    /// `true` if a scope with exactly this name exists.
    #[must_use]
    pub fn has_scope(&self, name: &str) -> bool {
        self.scopes.iter().any(|s| s.name == name)
    }
}

/// A scope exposed by an API resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiScope {
    /// Scope name, unique within the resource.
    pub name: String,
    /// Display name shown on consent screens.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// The user cannot deselect a required scope on the consent screen.
    #[serde(default)]
    pub required: bool,
    /// Highlighted on the consent screen.
    #[serde(default)]
    pub emphasize: bool,
    /// Listed in the discovery document.
    #[serde(default = "default_true")]
    pub show_in_discovery_document: bool,
    /// Claim types added to access tokens when this scope is requested.
    #[serde(default)]
    pub user_claims: Vec<String>,
}

impl ApiScope {
    /// A scope with default flags.
    #[must_use]
    pub fn named(name: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            display_name,
            description: None,
            required: false,
            emphasize: false,
            show_in_discovery_document: true,
            user_claims: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// The editable, top-level fields of an API resource.
///
/// Secrets and scopes are managed through their own commands and are never
/// replaced by a register or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResourceFields {
    /// Natural key.
    pub name: String,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Enabled flag.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Claim types included in access tokens.
    #[serde(default)]
    pub user_claims: Vec<String>,
}

impl ApiResourceFields {
    /// A new resource built from these fields.
    ///
    /// Every new resource starts with one scope named after itself, so that
    /// clients can request the API by name.
    #[must_use]
    pub fn into_new_resource(self) -> ApiResource {
        let default_scope = ApiScope::named(self.name.clone(), self.display_name.clone());
        ApiResource {
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            enabled: self.enabled,
            user_claims: self.user_claims,
            secrets: Vec::new(),
            scopes: vec![default_scope],
        }
    }

    /// `current` with these fields written over its own. Secrets and scopes
    /// are carried over unchanged.
    #[must_use]
    pub fn apply_to(self, current: ApiResource) -> ApiResource {
        ApiResource {
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            enabled: self.enabled,
            user_claims: self.user_claims,
            ..current
        }
    }
}
