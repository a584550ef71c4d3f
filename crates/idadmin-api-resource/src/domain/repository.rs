//! Persistence port for API resources.

use async_trait::async_trait;
use idadmin_core::error::DomainError;
use idadmin_core::secret::Secret;

use crate::domain::aggregates::{ApiResource, ApiScope};

/// Load and stage mutations of API resources and their children.
///
/// Mutations are staged in the caller's unit of work and become visible to
/// other scopes only when it commits.
#[async_trait]
pub trait ApiResourceRepository: Send + Sync {
    /// Loads a resource with its secrets and scopes.
    async fn get_resource(&self, name: &str) -> Result<Option<ApiResource>, DomainError>;

    /// Every resource, ordered by name.
    async fn list(&self) -> Result<Vec<ApiResource>, DomainError>;

    /// Stages a new resource.
    async fn add(&self, resource: ApiResource) -> Result<(), DomainError>;

    /// Stages the replacement of the resource stored under `old_name`.
    /// `resource.name` may differ from `old_name`. Top-level fields come from
    /// `resource`; secrets and scopes are kept as they stand at commit.
    async fn update_with_children(
        &self,
        old_name: &str,
        resource: ApiResource,
    ) -> Result<(), DomainError>;

    /// Stages removal of the resource and all of its children.
    async fn remove(&self, resource: &ApiResource) -> Result<(), DomainError>;

    /// Stages a new secret on `resource_name`.
    async fn add_secret(&self, resource_name: &str, secret: Secret) -> Result<(), DomainError>;

    /// Stages removal of the secret matching `(secret_type, value)`.
    async fn remove_secret(
        &self,
        resource_name: &str,
        secret_type: &str,
        value: &str,
    ) -> Result<(), DomainError>;

    /// Stages a new scope on `resource_name`.
    async fn add_scope(&self, resource_name: &str, scope: ApiScope) -> Result<(), DomainError>;

    /// Stages removal of the scope called `name`.
    async fn remove_scope(&self, resource_name: &str, name: &str) -> Result<(), DomainError>;
}
