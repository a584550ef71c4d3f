//! Query handlers for the persisted grant context.

use idadmin_core::error::DomainError;
use serde::Serialize;

use crate::domain::aggregates::PersistedGrant;
use crate::domain::repository::{GrantSearch, PersistedGrantRepository};

/// One page of a grant search.
#[derive(Debug, Serialize)]
pub struct GrantPage {
    /// Matches across all pages.
    pub total: usize,
    /// Offset of the first item.
    pub offset: usize,
    /// Effective page size.
    pub limit: usize,
    /// The page.
    pub items: Vec<PersistedGrant>,
}

/// Searches grants by subject and client, one page at a time.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn search_grants(
    search: &GrantSearch,
    repo: &dyn PersistedGrantRepository,
) -> Result<GrantPage, DomainError> {
    let total = repo.count(search).await?;
    let items = repo.search(search).await?;
    Ok(GrantPage {
        total,
        offset: search.offset,
        limit: search.page_size(),
        items,
    })
}

/// Retrieves one grant by key.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no grant has that key.
/// Returns `DomainError::Infrastructure` if the store fails.
pub async fn get_grant(
    key: &str,
    repo: &dyn PersistedGrantRepository,
) -> Result<PersistedGrant, DomainError> {
    repo.get_grant(key)
        .await?
        .ok_or_else(|| DomainError::AggregateNotFound(key.to_owned()))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use idadmin_test_support::fixed_now;

    use super::*;

    struct StaticRepository(Vec<PersistedGrant>);

    #[async_trait]
    impl PersistedGrantRepository for StaticRepository {
        async fn get_grant(&self, key: &str) -> Result<Option<PersistedGrant>, DomainError> {
            Ok(self.0.iter().find(|g| g.key == key).cloned())
        }

        async fn search(&self, search: &GrantSearch) -> Result<Vec<PersistedGrant>, DomainError> {
            Ok(self
                .0
                .iter()
                .filter(|g| search.matches(g))
                .skip(search.offset)
                .take(search.page_size())
                .cloned()
                .collect())
        }

        async fn count(&self, search: &GrantSearch) -> Result<usize, DomainError> {
            Ok(self.0.iter().filter(|g| search.matches(g)).count())
        }

        async fn remove(&self, _grant: &PersistedGrant) -> Result<(), DomainError> {
            unimplemented!()
        }
    }

    fn grant(key: &str, subject_id: &str) -> PersistedGrant {
        PersistedGrant {
            key: key.to_owned(),
            grant_type: "refresh_token".to_owned(),
            subject_id: subject_id.to_owned(),
            client_id: "spa".to_owned(),
            creation_time: fixed_now(),
            expiration: None,
            data: "{}".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_search_reports_total_and_page() {
        // Arrange
        let repo = StaticRepository(vec![
            grant("a", "alice"),
            grant("b", "alice"),
            grant("c", "alice"),
            grant("d", "bob"),
        ]);
        let search = GrantSearch {
            subject_id: Some("alice".to_owned()),
            offset: 1,
            limit: 1,
            ..GrantSearch::default()
        };

        // Act
        let page = search_grants(&search, &repo).await.unwrap();

        // Assert
        assert_eq!(page.total, 3);
        assert_eq!(page.limit, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].key, "b");
    }

    #[tokio::test]
    async fn test_get_unknown_grant_is_not_found() {
        let repo = StaticRepository(Vec::new());

        let result = get_grant("missing", &repo).await;

        assert_eq!(
            result.unwrap_err(),
            DomainError::AggregateNotFound("missing".to_owned())
        );
    }
}
