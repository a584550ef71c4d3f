//! Persistence port for identity resources.

use async_trait::async_trait;
use idadmin_core::error::DomainError;

use crate::domain::aggregates::IdentityResource;

/// Load and stage mutations of identity resources.
#[async_trait]
pub trait IdentityResourceRepository: Send + Sync {
    /// Loads a resource by name.
    async fn get_resource(&self, name: &str) -> Result<Option<IdentityResource>, DomainError>;

    /// Every resource, ordered by name.
    async fn list(&self) -> Result<Vec<IdentityResource>, DomainError>;

    /// Stages a new resource.
    async fn add(&self, resource: IdentityResource) -> Result<(), DomainError>;

    /// Stages the replacement of the resource stored under `old_name`.
    async fn update(&self, old_name: &str, resource: IdentityResource) -> Result<(), DomainError>;

    /// Stages removal of the resource.
    async fn remove(&self, resource: &IdentityResource) -> Result<(), DomainError>;
}
