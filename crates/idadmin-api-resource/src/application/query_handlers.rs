//! Query handlers for the API resource context.
//!
//! Read-only views over committed state. Secret values never leave the
//! store through these views.

use idadmin_core::error::DomainError;
use idadmin_core::secret::SecretView;
use serde::Serialize;

use crate::domain::aggregates::{ApiResource, ApiScope};
use crate::domain::repository::ApiResourceRepository;

/// Read-only view of an API resource.
#[derive(Debug, Serialize)]
pub struct ApiResourceView {
    /// Natural key.
    pub name: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Enabled flag.
    pub enabled: bool,
    /// Claim types included in access tokens.
    pub user_claims: Vec<String>,
    /// Secrets, without their values.
    pub secrets: Vec<SecretView>,
    /// Scopes.
    pub scopes: Vec<ApiScope>,
}

impl From<ApiResource> for ApiResourceView {
    fn from(resource: ApiResource) -> Self {
        Self {
            secrets: resource.secrets.iter().map(SecretView::from).collect(),
            name: resource.name,
            display_name: resource.display_name,
            description: resource.description,
            enabled: resource.enabled,
            user_claims: resource.user_claims,
            scopes: resource.scopes,
        }
    }
}

/// One line of the resource listing.
#[derive(Debug, Serialize)]
pub struct ApiResourceSummary {
    /// Natural key.
    pub name: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Enabled flag.
    pub enabled: bool,
    /// Names of the resource's scopes.
    pub scopes: Vec<String>,
}

/// Retrieves an API resource by name.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no resource has that name.
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_api_resource(
    name: &str,
    repo: &dyn ApiResourceRepository,
) -> Result<ApiResourceView, DomainError> {
    repo.get_resource(name)
        .await?
        .map(ApiResourceView::from)
        .ok_or_else(|| DomainError::AggregateNotFound(name.to_owned()))
}

/// Lists every API resource, ordered by name.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn list_api_resources(
    repo: &dyn ApiResourceRepository,
) -> Result<Vec<ApiResourceSummary>, DomainError> {
    let mut resources = repo.list().await?;
    resources.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(resources
        .into_iter()
        .map(|r| ApiResourceSummary {
            scopes: r.scopes.into_iter().map(|s| s.name).collect(),
            name: r.name,
            display_name: r.display_name,
            enabled: r.enabled,
        })
        .collect())
}
