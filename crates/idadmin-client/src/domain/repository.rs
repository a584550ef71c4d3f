//! Persistence port for clients.

use async_trait::async_trait;
use idadmin_core::error::DomainError;
use idadmin_core::secret::Secret;

use crate::domain::aggregates::{Client, ClientClaim, ClientProperty};

/// Load and stage mutations of clients and their children.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Loads a client with its secrets, claims and properties.
    async fn get_client(&self, client_id: &str) -> Result<Option<Client>, DomainError>;

    /// Every client, ordered by client id.
    async fn list(&self) -> Result<Vec<Client>, DomainError>;

    /// Stages a new client, children included.
    async fn add(&self, client: Client) -> Result<(), DomainError>;

    /// Stages the replacement of the client stored under `old_client_id`.
    /// Settings come from `client`; secrets, claims and properties are kept
    /// as they stand at commit.
    async fn update_with_children(&self, old_client_id: &str, client: Client) -> Result<(), DomainError>;

    /// Stages removal of the client and all of its children.
    async fn remove(&self, client: &Client) -> Result<(), DomainError>;

    /// Stages a new secret.
    async fn add_secret(&self, client_id: &str, secret: Secret) -> Result<(), DomainError>;

    /// Stages removal of the secret matching `(secret_type, value)`.
    async fn remove_secret(&self, client_id: &str, secret_type: &str, value: &str) -> Result<(), DomainError>;

    /// Stages a new claim.
    async fn add_claim(&self, client_id: &str, claim: ClientClaim) -> Result<(), DomainError>;

    /// Stages removal of the claim matching `(claim_type, value)`.
    async fn remove_claim(&self, client_id: &str, claim_type: &str, value: &str) -> Result<(), DomainError>;

    /// Stages a new property.
    async fn add_property(&self, client_id: &str, property: ClientProperty) -> Result<(), DomainError>;

    /// Stages removal of the property matching `(key, value)`.
    async fn remove_property(&self, client_id: &str, key: &str, value: &str) -> Result<(), DomainError>;
}
