//! Audit trail of committed changes.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use idadmin_core::bus::{Message, Subscriber, SubscriberError};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// One committed change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    /// Event type, e.g. `api_resource.registered`.
    pub event_type: String,
    /// Natural key of the changed aggregate.
    pub aggregate_id: String,
    /// Correlation ID of the command.
    pub correlation_id: Uuid,
    /// Commit time.
    pub occurred_at: DateTime<Utc>,
    /// Serialized event.
    pub payload: serde_json::Value,
}

/// Entries kept by [`AuditLog::default`].
pub const DEFAULT_AUDIT_CAPACITY: usize = 1000;

/// Subscriber that records and logs every domain event.
///
/// Only the most recent `capacity` entries are kept; older ones are evicted
/// first. Every event is still logged.
#[derive(Debug)]
pub struct AuditLog {
    capacity: usize,
    entries: Mutex<VecDeque<AuditEntry>>,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_AUDIT_CAPACITY)
    }
}

impl AuditLog {
    /// An empty log holding at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Retained entries in publication order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Subscriber for AuditLog {
    fn name(&self) -> &'static str {
        "audit-log"
    }

    async fn on_message(&self, message: &Message<'_>) -> Result<(), SubscriberError> {
        let Message::Event(event) = message else {
            return Ok(());
        };
        let metadata = event.metadata();
        info!(
            event_type = event.event_type(),
            aggregate_id = %metadata.aggregate_id,
            correlation_id = %metadata.correlation_id,
            "change committed"
        );
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SubscriberError::new("audit log lock poisoned"))?;
        if self.capacity == 0 {
            return Ok(());
        }
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(AuditEntry {
            event_type: event.event_type().to_owned(),
            aggregate_id: metadata.aggregate_id.clone(),
            correlation_id: metadata.correlation_id,
            occurred_at: metadata.occurred_at,
            payload: event.to_payload(),
        });
        Ok(())
    }
}
