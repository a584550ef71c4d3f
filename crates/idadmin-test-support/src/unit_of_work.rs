//! Test units of work.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use idadmin_core::unit_of_work::UnitOfWork;
use tokio_util::sync::CancellationToken;

/// A unit of work that returns a configured commit result and counts calls.
#[derive(Debug)]
pub struct RecordingUnitOfWork {
    result: bool,
    commits: AtomicUsize,
}

impl RecordingUnitOfWork {
    /// Every commit succeeds.
    #[must_use]
    pub fn succeeding() -> Self {
        Self {
            result: true,
            commits: AtomicUsize::new(0),
        }
    }

    /// Every commit is rejected, simulating a store-side failure.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            result: false,
            commits: AtomicUsize::new(0),
        }
    }

    /// How many times `commit` was called.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitOfWork for RecordingUnitOfWork {
    async fn commit(&self) -> bool {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.result
    }
}

/// A unit of work that cancels the given token when commit starts and then
/// never finishes. Used to pin cancellation at the commit suspension point.
#[derive(Debug)]
pub struct CancellingUnitOfWork {
    token: CancellationToken,
    commits: AtomicUsize,
}

impl CancellingUnitOfWork {
    /// Cancels `token` on the first commit.
    #[must_use]
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            commits: AtomicUsize::new(0),
        }
    }

    /// How many times `commit` was called.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitOfWork for CancellingUnitOfWork {
    async fn commit(&self) -> bool {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.token.cancel();
        std::future::pending::<bool>().await
    }
}
