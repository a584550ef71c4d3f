//! Unit of work abstraction.

use async_trait::async_trait;

/// Transaction boundary around the repository mutations of one command.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Persists every mutation staged since the last commit, all together.
    ///
    /// Returns `false` when the store rejects the transaction or when nothing
    /// was pending. A `false` commit leaves no partial state behind.
    async fn commit(&self) -> bool;
}
