//! Secrets shared by API resources and clients.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

/// Secret type used for shared (symmetric) secrets.
pub const SHARED_SECRET: &str = "SharedSecret";

/// A secret attached to an API resource or a client.
///
/// `value` is stored exactly as persisted: hashed secrets hold the base64
/// digest, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Discriminator, e.g. `SharedSecret` or `X509Thumbprint`.
    pub secret_type: String,
    /// Stored value.
    pub value: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Expiry, if any.
    pub expiration: Option<DateTime<Utc>>,
}

impl Secret {
    /// Exact match on discriminator and stored value.
    #[must_use]
    pub fn matches(&self, secret_type: &str, value: &str) -> bool {
        self.secret_type == secret_type && self.value == value
    }
}

/// How a plaintext secret is transformed before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashType {
    /// Base64 of the SHA-256 digest.
    #[default]
    Sha256,
    /// Base64 of the SHA-512 digest.
    Sha512,
    /// Stored as given.
    Plain,
}

impl HashType {
    /// Returns the value to persist for `plaintext`.
    #[must_use]
    pub fn apply(self, plaintext: &str) -> String {
        match self {
            Self::Sha256 => STANDARD.encode(Sha256::digest(plaintext.as_bytes())),
            Self::Sha512 => STANDARD.encode(Sha512::digest(plaintext.as_bytes())),
            Self::Plain => plaintext.to_owned(),
        }
    }
}

/// Input for saving a new secret on a parent aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSecret {
    /// Discriminator.
    #[serde(default = "shared_secret")]
    pub secret_type: String,
    /// Plaintext value as entered.
    pub value: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Expiry, if any.
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    /// How to transform `value` before storing it.
    #[serde(default)]
    pub hash_type: HashType,
}

fn shared_secret() -> String {
    SHARED_SECRET.to_owned()
}

impl NewSecret {
    /// The secret as it will be persisted.
    #[must_use]
    pub fn to_secret(&self) -> Secret {
        Secret {
            secret_type: self.secret_type.clone(),
            value: self.hash_type.apply(&self.value),
            description: self.description.clone(),
            expiration: self.expiration,
        }
    }
}

/// Read-only view of a secret; the stored value is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretView {
    /// Discriminator.
    pub secret_type: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Expiry, if any.
    pub expiration: Option<DateTime<Utc>>,
}

impl From<&Secret> for SecretView {
    fn from(secret: &Secret) -> Self {
        Self {
            secret_type: secret.secret_type.clone(),
            description: secret.description.clone(),
            expiration: secret.expiration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_matches_known_digest() {
        // base64(sha256("secret"))
        assert_eq!(
            HashType::Sha256.apply("secret"),
            "K7gNU3sdo+OL0wNhqoVWhr3g6s1xYv72ol/pe/Unols="
        );
    }

    #[test]
    fn test_plain_is_stored_verbatim() {
        assert_eq!(HashType::Plain.apply("thumbprint"), "thumbprint");
    }

    #[test]
    fn test_sha512_differs_from_sha256() {
        assert_ne!(HashType::Sha512.apply("secret"), HashType::Sha256.apply("secret"));
        assert_eq!(HashType::Sha512.apply("secret").len(), 88);
    }

    #[test]
    fn test_new_secret_hashes_value_on_save() {
        let new_secret = NewSecret {
            secret_type: SHARED_SECRET.to_owned(),
            value: "secret".to_owned(),
            description: Some("primary".to_owned()),
            expiration: None,
            hash_type: HashType::Sha256,
        };

        let secret = new_secret.to_secret();

        assert!(secret.matches(SHARED_SECRET, &HashType::Sha256.apply("secret")));
        assert!(!secret.matches(SHARED_SECRET, "secret"));
        assert!(!secret.matches("X509Thumbprint", &secret.value));
    }
}
