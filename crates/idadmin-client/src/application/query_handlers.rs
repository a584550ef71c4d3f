//! Query handlers for the client context.
//!
//! Secret values are withheld from every view.

use idadmin_core::error::DomainError;
use idadmin_core::secret::SecretView;
use serde::Serialize;

use crate::domain::aggregates::{Client, ClientClaim, ClientProperty, ClientSettings};
use crate::domain::repository::ClientRepository;

/// Read-only view of a client.
#[derive(Debug, Serialize)]
pub struct ClientView {
    /// Settings.
    #[serde(flatten)]
    pub settings: ClientSettings,
    /// Secrets, without their values.
    pub secrets: Vec<SecretView>,
    /// Claims.
    pub claims: Vec<ClientClaim>,
    /// Properties.
    pub properties: Vec<ClientProperty>,
}

impl From<Client> for ClientView {
    fn from(client: Client) -> Self {
        Self {
            secrets: client.secrets.iter().map(SecretView::from).collect(),
            settings: client.settings,
            claims: client.claims,
            properties: client.properties,
        }
    }
}

/// One line of the client listing.
#[derive(Debug, Serialize)]
pub struct ClientSummary {
    /// Natural key.
    pub client_id: String,
    /// Display name.
    pub client_name: String,
    /// Enabled flag.
    pub enabled: bool,
    /// Permitted grant types.
    pub allowed_grant_types: Vec<String>,
}

/// Retrieves a client by id.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no client has that id.
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_client(client_id: &str, repo: &dyn ClientRepository) -> Result<ClientView, DomainError> {
    repo.get_client(client_id)
        .await?
        .map(ClientView::from)
        .ok_or_else(|| DomainError::AggregateNotFound(client_id.to_owned()))
}

/// Lists every client, ordered by client id.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn list_clients(repo: &dyn ClientRepository) -> Result<Vec<ClientSummary>, DomainError> {
    let mut clients = repo.list().await?;
    clients.sort_by(|a, b| a.client_id().cmp(b.client_id()));
    Ok(clients
        .into_iter()
        .map(|c| ClientSummary {
            client_id: c.settings.client_id,
            client_name: c.settings.client_name,
            enabled: c.settings.enabled,
            allowed_grant_types: c.settings.allowed_grant_types,
        })
        .collect())
}
