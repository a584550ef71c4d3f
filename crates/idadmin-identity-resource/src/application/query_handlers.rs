//! Query handlers for the identity resource context.

use idadmin_core::error::DomainError;

use crate::domain::aggregates::IdentityResource;
use crate::domain::repository::IdentityResourceRepository;

/// Retrieves an identity resource by name.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no resource has that name.
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_identity_resource(
    name: &str,
    repo: &dyn IdentityResourceRepository,
) -> Result<IdentityResource, DomainError> {
    repo.get_resource(name)
        .await?
        .ok_or_else(|| DomainError::AggregateNotFound(name.to_owned()))
}

/// Lists every identity resource, ordered by name.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn list_identity_resources(
    repo: &dyn IdentityResourceRepository,
) -> Result<Vec<IdentityResource>, DomainError> {
    let mut resources = repo.list().await?;
    resources.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(resources)
}
