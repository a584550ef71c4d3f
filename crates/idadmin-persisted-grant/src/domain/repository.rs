//! Persistence port for persisted grants.

use async_trait::async_trait;
use idadmin_core::error::DomainError;
use serde::Deserialize;

use crate::domain::aggregates::PersistedGrant;

/// Largest page a search may request.
pub const MAX_PAGE_SIZE: usize = 100;

const DEFAULT_PAGE_SIZE: usize = 10;

/// Filter and page for grant searches. Empty filters match everything.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GrantSearch {
    /// Only grants issued to this user.
    #[serde(default)]
    pub subject_id: Option<String>,
    /// Only grants issued for this client.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Matches to skip.
    #[serde(default)]
    pub offset: usize,
    /// Page size; clamped to `1..=MAX_PAGE_SIZE`.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for GrantSearch {
    fn default() -> Self {
        Self {
            subject_id: None,
            client_id: None,
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl GrantSearch {
    /// `true` if `grant` passes both filters.
    #[must_use]
    pub fn matches(&self, grant: &PersistedGrant) -> bool {
        let subject_ok = self
            .subject_id
            .as_deref()
            .is_none_or(|s| grant.subject_id == s);
        let client_ok = self
            .client_id
            .as_deref()
            .is_none_or(|c| grant.client_id == c);
        subject_ok && client_ok
    }

    /// The effective page size.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Load, search and stage removal of persisted grants.
#[async_trait]
pub trait PersistedGrantRepository: Send + Sync {
    /// Loads one grant by key.
    async fn get_grant(&self, key: &str) -> Result<Option<PersistedGrant>, DomainError>;

    /// One page of matching grants, newest first.
    async fn search(&self, search: &GrantSearch) -> Result<Vec<PersistedGrant>, DomainError>;

    /// How many grants match, ignoring paging.
    async fn count(&self, search: &GrantSearch) -> Result<usize, DomainError>;

    /// Stages removal of the grant.
    async fn remove(&self, grant: &PersistedGrant) -> Result<(), DomainError>;
}
