//! Aggregate roots for the client context.

use idadmin_core::secret::Secret;
use serde::{Deserialize, Serialize};

/// Grant type identifiers.
pub mod grant_types {
    /// Implicit flow.
    pub const IMPLICIT: &str = "implicit";
    /// Hybrid flow.
    pub const HYBRID: &str = "hybrid";
    /// Authorization code flow.
    pub const AUTHORIZATION_CODE: &str = "authorization_code";
    /// Client credentials flow.
    pub const CLIENT_CREDENTIALS: &str = "client_credentials";
    /// Resource owner password flow.
    pub const PASSWORD: &str = "password";
    /// Device authorization flow.
    pub const DEVICE_CODE: &str = "urn:ietf:params:oauth:grant-type:device_code";
}

/// Prefix of the client id given to copies.
pub const COPY_PREFIX: &str = "copy-of-";

/// The client id a copy of `client_id` is stored under.
#[must_use]
pub fn copy_id(client_id: &str) -> String {
    format!("{COPY_PREFIX}{client_id}")
}

/// `false` when the list mixes front-channel flows that cannot be combined:
/// implicit, hybrid and authorization code are mutually exclusive.
#[must_use]
pub fn grant_combination_is_valid(grant_types: &[String]) -> bool {
    let exclusive = [
        grant_types::IMPLICIT,
        grant_types::HYBRID,
        grant_types::AUTHORIZATION_CODE,
    ];
    grant_types
        .iter()
        .filter(|g| exclusive.contains(&g.as_str()))
        .count()
        <= 1
}

fn default_true() -> bool {
    true
}

fn default_access_token_lifetime() -> u32 {
    3600
}

fn default_short_lifetime() -> u32 {
    300
}

/// The editable settings of a client. Children (secrets, claims, properties)
/// are managed through their own commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Natural key.
    pub client_id: String,
    /// Display name.
    pub client_name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Home page of the client.
    #[serde(default)]
    pub client_uri: Option<String>,
    /// Logo shown on the consent screen.
    #[serde(default)]
    pub logo_uri: Option<String>,
    /// Disabled clients cannot obtain tokens.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// A secret is required at the token endpoint.
    #[serde(default = "default_true")]
    pub require_client_secret: bool,
    /// A consent screen is shown.
    #[serde(default)]
    pub require_consent: bool,
    /// The user may remember a consent decision.
    #[serde(default = "default_true")]
    pub allow_remember_consent: bool,
    /// Authorization code requests must use PKCE.
    #[serde(default)]
    pub require_pkce: bool,
    /// Access tokens may be returned through the browser.
    #[serde(default)]
    pub allow_access_tokens_via_browser: bool,
    /// Refresh tokens may be requested.
    #[serde(default)]
    pub allow_offline_access: bool,
    /// Permitted grant types.
    #[serde(default)]
    pub allowed_grant_types: Vec<String>,
    /// Permitted redirect URIs.
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    /// Permitted post-logout redirect URIs.
    #[serde(default)]
    pub post_logout_redirect_uris: Vec<String>,
    /// Origins allowed to call the token endpoint from a browser.
    #[serde(default)]
    pub allowed_cors_origins: Vec<String>,
    /// Scopes the client may request.
    #[serde(default)]
    pub allowed_scopes: Vec<String>,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime: u32,
    /// Identity token lifetime in seconds.
    #[serde(default = "default_short_lifetime")]
    pub identity_token_lifetime: u32,
    /// Authorization code lifetime in seconds.
    #[serde(default = "default_short_lifetime")]
    pub authorization_code_lifetime: u32,
}

/// Starting configuration applied when a client is first saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientType {
    /// Settings are stored as given.
    #[default]
    Empty,
    /// Browser application using the implicit flow.
    WebImplicit,
    /// Server-side web application using the hybrid flow.
    WebHybrid,
    /// Single-page application using code flow with PKCE.
    Spa,
    /// Desktop or mobile application using code flow with PKCE.
    Native,
    /// Service-to-service client.
    Machine,
    /// Input-constrained device.
    Device,
}

impl ClientType {
    /// `settings` with the grant types and flags this type implies.
    #[must_use]
    pub fn apply(self, mut settings: ClientSettings) -> ClientSettings {
        let grants: &[&str] = match self {
            Self::Empty => return settings,
            Self::WebImplicit => {
                settings.allow_access_tokens_via_browser = true;
                settings.require_client_secret = false;
                &[grant_types::IMPLICIT]
            }
            Self::WebHybrid => {
                settings.allow_access_tokens_via_browser = false;
                &[grant_types::HYBRID]
            }
            Self::Spa => {
                settings.require_pkce = true;
                settings.require_client_secret = false;
                &[grant_types::AUTHORIZATION_CODE]
            }
            Self::Native => {
                settings.require_pkce = true;
                settings.require_client_secret = false;
                settings.allow_offline_access = true;
                &[grant_types::AUTHORIZATION_CODE]
            }
            Self::Machine => {
                settings.require_consent = false;
                &[grant_types::PASSWORD, grant_types::CLIENT_CREDENTIALS]
            }
            Self::Device => {
                settings.require_client_secret = false;
                settings.allow_offline_access = true;
                &[grant_types::DEVICE_CODE]
            }
        };
        settings.allowed_grant_types = grants.iter().map(|g| (*g).to_owned()).collect();
        settings
    }
}

/// A claim added to every token issued to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientClaim {
    /// Claim type.
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim value.
    pub value: String,
}

/// A free-form key/value pair attached to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProperty {
    /// Property key.
    pub key: String,
    /// Property value.
    pub value: String,
}

/// A client with its children, addressed by `settings.client_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Editable settings.
    #[serde(flatten)]
    pub settings: ClientSettings,
    /// Secrets for the token endpoint.
    #[serde(default)]
    pub secrets: Vec<Secret>,
    /// Claims added to tokens.
    #[serde(default)]
    pub claims: Vec<ClientClaim>,
    /// Free-form properties.
    #[serde(default)]
    pub properties: Vec<ClientProperty>,
}

impl Client {
    /// A client without children.
    #[must_use]
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            settings,
            secrets: Vec::new(),
            claims: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// The natural key.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.settings.client_id
    }

    /// `true` if a secret with exactly this type and stored value exists.
    #[must_use]
    pub fn has_secret(&self, secret_type: &str, value: &str) -> bool {
        self.secrets.iter().any(|s| s.matches(secret_type, value))
    }

    /// `true` if a claim with exactly this type and value exists.
    #[must_use]
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims
            .iter()
            .any(|c| c.claim_type == claim_type && c.value == value)
    }

    /// `true` if a property with this key exists, whatever its value.
    #[must_use]
    pub fn has_property_key(&self, key: &str) -> bool {
        self.properties.iter().any(|p| p.key == key)
    }

    /// `true` if a property with exactly this key and value exists.
    #[must_use]
    pub fn has_property(&self, key: &str, value: &str) -> bool {
        self.properties
            .iter()
            .any(|p| p.key == key && p.value == value)
    }

    /// A copy stored under [`copy_id`]. Claims and properties are copied;
    /// secrets are not.
    #[must_use]
    pub fn copied(&self) -> Self {
        let mut settings = self.settings.clone();
        settings.client_id = copy_id(&self.settings.client_id);
        settings.client_name = format!("Copy of {}", self.settings.client_name);
        Self {
            settings,
            secrets: Vec::new(),
            claims: self.claims.clone(),
            properties: self.properties.clone(),
        }
    }

    /// This client with `settings` replacing its own; children are kept.
    #[must_use]
    pub fn with_settings(self, settings: ClientSettings) -> Self {
        Self { settings, ..self }
    }
}

#[cfg(test)]
mod tests {
    use idadmin_core::secret::{SHARED_SECRET, Secret};

    use super::*;

    fn settings(client_id: &str) -> ClientSettings {
        serde_json::from_value(serde_json::json!({
            "client_id": client_id,
            "client_name": "Shop front",
        }))
        .unwrap()
    }

    #[test]
    fn test_settings_defaults() {
        let settings = settings("shop");

        assert!(settings.enabled);
        assert!(settings.require_client_secret);
        assert_eq!(settings.access_token_lifetime, 3600);
        assert_eq!(settings.identity_token_lifetime, 300);
        assert!(settings.allowed_grant_types.is_empty());
    }

    #[test]
    fn test_spa_preset_uses_code_with_pkce_and_no_secret() {
        let spa = ClientType::Spa.apply(settings("shop"));

        assert_eq!(spa.allowed_grant_types, vec![grant_types::AUTHORIZATION_CODE]);
        assert!(spa.require_pkce);
        assert!(!spa.require_client_secret);
    }

    #[test]
    fn test_machine_preset_combines_password_and_client_credentials() {
        let machine = ClientType::Machine.apply(settings("worker"));

        assert_eq!(
            machine.allowed_grant_types,
            vec![grant_types::PASSWORD, grant_types::CLIENT_CREDENTIALS]
        );
        assert!(grant_combination_is_valid(&machine.allowed_grant_types));
    }

    #[test]
    fn test_empty_preset_keeps_settings() {
        let mut given = settings("shop");
        given.allowed_grant_types = vec![grant_types::HYBRID.to_owned()];

        assert_eq!(ClientType::Empty.apply(given.clone()), given);
    }

    #[test]
    fn test_front_channel_flows_cannot_be_mixed() {
        let mixed = vec![
            grant_types::IMPLICIT.to_owned(),
            grant_types::AUTHORIZATION_CODE.to_owned(),
        ];

        assert!(!grant_combination_is_valid(&mixed));
    }

    #[test]
    fn test_copy_drops_secrets_and_renames() {
        let mut client = Client::new(settings("shop"));
        client.secrets.push(Secret {
            secret_type: SHARED_SECRET.to_owned(),
            value: "digest".to_owned(),
            description: None,
            expiration: None,
        });
        client.claims.push(ClientClaim {
            claim_type: "tenant".to_owned(),
            value: "eu".to_owned(),
        });

        let copy = client.copied();

        assert_eq!(copy.client_id(), "copy-of-shop");
        assert_eq!(copy.settings.client_name, "Copy of Shop front");
        assert!(copy.secrets.is_empty());
        assert!(copy.has_claim("tenant", "eu"));
    }

    #[test]
    fn test_client_type_uses_kebab_case_names() {
        let parsed: ClientType = serde_json::from_str("\"web-implicit\"").unwrap();

        assert_eq!(parsed, ClientType::WebImplicit);
    }
}
