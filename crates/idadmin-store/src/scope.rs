//! One unit of work over the in-memory tables.

use std::sync::Arc;

use async_trait::async_trait;
use idadmin_api_resource::domain::aggregates::{ApiResource, ApiScope};
use idadmin_api_resource::domain::repository::ApiResourceRepository;
use idadmin_client::domain::aggregates::{Client, ClientClaim, ClientProperty};
use idadmin_client::domain::repository::ClientRepository;
use idadmin_core::error::DomainError;
use idadmin_core::secret::Secret;
use idadmin_core::unit_of_work::UnitOfWork;
use idadmin_identity_resource::domain::aggregates::IdentityResource;
use idadmin_identity_resource::domain::repository::IdentityResourceRepository;
use idadmin_persisted_grant::domain::aggregates::PersistedGrant;
use idadmin_persisted_grant::domain::repository::{GrantSearch, PersistedGrantRepository};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::tables::Tables;

type Change = Box<dyn FnOnce(&mut Tables) -> Result<(), StoreError> + Send>;

/// Repositories and unit of work for a single command.
///
/// Reads see committed state only. Mutations are queued until
/// [`UnitOfWork::commit`], which applies the whole queue to a copy of the
/// tables and swaps it in only if every change succeeds.
pub struct StoreScope {
    committed: Arc<RwLock<Tables>>,
    pending: Mutex<Vec<Change>>,
}

impl std::fmt::Debug for StoreScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreScope").finish_non_exhaustive()
    }
}

impl StoreScope {
    pub(crate) fn new(committed: Arc<RwLock<Tables>>) -> Self {
        Self {
            committed,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Number of staged, uncommitted changes.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    async fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        f(&*self.committed.read().await)
    }

    async fn stage(
        &self,
        change: impl FnOnce(&mut Tables) -> Result<(), StoreError> + Send + 'static,
    ) -> Result<(), DomainError> {
        self.pending.lock().await.push(Box::new(change));
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for StoreScope {
    async fn commit(&self) -> bool {
        let changes = std::mem::take(&mut *self.pending.lock().await);
        if changes.is_empty() {
            debug!("nothing staged; commit skipped");
            return false;
        }

        let count = changes.len();
        let mut committed = self.committed.write().await;
        let mut next = committed.clone();
        for change in changes {
            if let Err(error) = change(&mut next) {
                warn!(%error, "commit rejected; no changes applied");
                return false;
            }
        }
        *committed = next;
        debug!(changes = count, "commit applied");
        true
    }
}

#[async_trait]
impl ApiResourceRepository for StoreScope {
    async fn get_resource(&self, name: &str) -> Result<Option<ApiResource>, DomainError> {
        Ok(self.read(|t| t.api_resources.get(name).cloned()).await)
    }

    async fn list(&self) -> Result<Vec<ApiResource>, DomainError> {
        Ok(self
            .read(|t| t.api_resources.values().cloned().collect())
            .await)
    }

    async fn add(&self, resource: ApiResource) -> Result<(), DomainError> {
        self.stage(move |t| t.insert_api_resource(resource)).await
    }

    async fn update_with_children(
        &self,
        old_name: &str,
        resource: ApiResource,
    ) -> Result<(), DomainError> {
        let old_name = old_name.to_owned();
        self.stage(move |t| t.replace_api_resource(&old_name, resource))
            .await
    }

    async fn remove(&self, resource: &ApiResource) -> Result<(), DomainError> {
        let name = resource.name.clone();
        self.stage(move |t| t.delete_api_resource(&name)).await
    }

    async fn add_secret(&self, resource_name: &str, secret: Secret) -> Result<(), DomainError> {
        let name = resource_name.to_owned();
        self.stage(move |t| t.add_api_secret(&name, secret)).await
    }

    async fn remove_secret(
        &self,
        resource_name: &str,
        secret_type: &str,
        value: &str,
    ) -> Result<(), DomainError> {
        let (name, secret_type, value) = (
            resource_name.to_owned(),
            secret_type.to_owned(),
            value.to_owned(),
        );
        self.stage(move |t| t.remove_api_secret(&name, &secret_type, &value))
            .await
    }

    async fn add_scope(&self, resource_name: &str, scope: ApiScope) -> Result<(), DomainError> {
        let name = resource_name.to_owned();
        self.stage(move |t| t.add_api_scope(&name, scope)).await
    }

    async fn remove_scope(&self, resource_name: &str, name: &str) -> Result<(), DomainError> {
        let (resource_name, scope_name) = (resource_name.to_owned(), name.to_owned());
        self.stage(move |t| t.remove_api_scope(&resource_name, &scope_name))
            .await
    }
}

#[async_trait]
impl ClientRepository for StoreScope {
    async fn get_client(&self, client_id: &str) -> Result<Option<Client>, DomainError> {
        Ok(self.read(|t| t.clients.get(client_id).cloned()).await)
    }

    async fn list(&self) -> Result<Vec<Client>, DomainError> {
        Ok(self.read(|t| t.clients.values().cloned().collect()).await)
    }

    async fn add(&self, client: Client) -> Result<(), DomainError> {
        self.stage(move |t| t.insert_client(client)).await
    }

    async fn update_with_children(&self, old_client_id: &str, client: Client) -> Result<(), DomainError> {
        let old_client_id = old_client_id.to_owned();
        self.stage(move |t| t.replace_client(&old_client_id, client))
            .await
    }

    async fn remove(&self, client: &Client) -> Result<(), DomainError> {
        let client_id = client.client_id().to_owned();
        self.stage(move |t| t.delete_client(&client_id)).await
    }

    async fn add_secret(&self, client_id: &str, secret: Secret) -> Result<(), DomainError> {
        let client_id = client_id.to_owned();
        self.stage(move |t| t.add_client_secret(&client_id, secret))
            .await
    }

    async fn remove_secret(&self, client_id: &str, secret_type: &str, value: &str) -> Result<(), DomainError> {
        let (client_id, secret_type, value) = (
            client_id.to_owned(),
            secret_type.to_owned(),
            value.to_owned(),
        );
        self.stage(move |t| t.remove_client_secret(&client_id, &secret_type, &value))
            .await
    }

    async fn add_claim(&self, client_id: &str, claim: ClientClaim) -> Result<(), DomainError> {
        let client_id = client_id.to_owned();
        self.stage(move |t| t.add_client_claim(&client_id, claim))
            .await
    }

    async fn remove_claim(&self, client_id: &str, claim_type: &str, value: &str) -> Result<(), DomainError> {
        let (client_id, claim_type, value) = (
            client_id.to_owned(),
            claim_type.to_owned(),
            value.to_owned(),
        );
        self.stage(move |t| t.remove_client_claim(&client_id, &claim_type, &value))
            .await
    }

    async fn add_property(&self, client_id: &str, property: ClientProperty) -> Result<(), DomainError> {
        let client_id = client_id.to_owned();
        self.stage(move |t| t.add_client_property(&client_id, property))
            .await
    }

    async fn remove_property(&self, client_id: &str, key: &str, value: &str) -> Result<(), DomainError> {
        let (client_id, key, value) = (client_id.to_owned(), key.to_owned(), value.to_owned());
        self.stage(move |t| t.remove_client_property(&client_id, &key, &value))
            .await
    }
}

#[async_trait]
impl IdentityResourceRepository for StoreScope {
    async fn get_resource(&self, name: &str) -> Result<Option<IdentityResource>, DomainError> {
        Ok(self.read(|t| t.identity_resources.get(name).cloned()).await)
    }

    async fn list(&self) -> Result<Vec<IdentityResource>, DomainError> {
        Ok(self
            .read(|t| t.identity_resources.values().cloned().collect())
            .await)
    }

    async fn add(&self, resource: IdentityResource) -> Result<(), DomainError> {
        self.stage(move |t| t.insert_identity_resource(resource))
            .await
    }

    async fn update(&self, old_name: &str, resource: IdentityResource) -> Result<(), DomainError> {
        let old_name = old_name.to_owned();
        self.stage(move |t| t.replace_identity_resource(&old_name, resource))
            .await
    }

    async fn remove(&self, resource: &IdentityResource) -> Result<(), DomainError> {
        let name = resource.name.clone();
        self.stage(move |t| t.delete_identity_resource(&name)).await
    }
}

#[async_trait]
impl PersistedGrantRepository for StoreScope {
    async fn get_grant(&self, key: &str) -> Result<Option<PersistedGrant>, DomainError> {
        Ok(self.read(|t| t.grants.get(key).cloned()).await)
    }

    async fn search(&self, search: &GrantSearch) -> Result<Vec<PersistedGrant>, DomainError> {
        let mut matches: Vec<PersistedGrant> = self
            .read(|t| {
                t.grants
                    .values()
                    .filter(|g| search.matches(g))
                    .cloned()
                    .collect()
            })
            .await;
        matches.sort_by(|a, b| {
            b.creation_time
                .cmp(&a.creation_time)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(matches
            .into_iter()
            .skip(search.offset)
            .take(search.page_size())
            .collect())
    }

    async fn count(&self, search: &GrantSearch) -> Result<usize, DomainError> {
        Ok(self
            .read(|t| t.grants.values().filter(|g| search.matches(g)).count())
            .await)
    }

    async fn remove(&self, grant: &PersistedGrant) -> Result<(), DomainError> {
        let key = grant.key.clone();
        self.stage(move |t| t.delete_grant(&key)).await
    }
}
