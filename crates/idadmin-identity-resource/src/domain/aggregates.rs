//! Aggregate roots for the identity resource context.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// A named group of user claims, addressed by its unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResource {
    /// Natural key, used as the scope name.
    pub name: String,
    /// Display name shown on consent screens.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Disabled resources cannot be requested.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// The user cannot deselect it on the consent screen.
    #[serde(default)]
    pub required: bool,
    /// Highlighted on the consent screen.
    #[serde(default)]
    pub emphasize: bool,
    /// Listed in the discovery document.
    #[serde(default = "default_true")]
    pub show_in_discovery_document: bool,
    /// Claim types released when the resource is granted.
    #[serde(default)]
    pub user_claims: Vec<String>,
}
