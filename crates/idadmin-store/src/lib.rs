//! In-memory store for idadmin.
//!
//! [`InMemoryStore`] holds the committed tables. Each command runs against
//! its own [`StoreScope`], which implements every repository port and the
//! unit of work: mutations are staged in the scope and applied to the
//! committed tables together, or not at all, when the scope commits.

mod error;
mod scope;
mod tables;

pub use error::StoreError;
pub use scope::StoreScope;
pub use tables::Tables;

use std::sync::Arc;

use idadmin_persisted_grant::domain::aggregates::PersistedGrant;
use tokio::sync::RwLock;

/// Committed state shared by every scope.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a unit of work over the current committed state.
    #[must_use]
    pub fn scope(&self) -> Arc<StoreScope> {
        Arc::new(StoreScope::new(Arc::clone(&self.tables)))
    }

    /// Writes a grant directly. Grants are issued by the identity provider,
    /// never through an admin command.
    pub async fn insert_grant(&self, grant: PersistedGrant) {
        self.tables
            .write()
            .await
            .grants
            .insert(grant.key.clone(), grant);
    }

    /// A copy of the committed tables.
    pub async fn snapshot(&self) -> Tables {
        self.tables.read().await.clone()
    }
}
