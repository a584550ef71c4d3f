//! Domain events for the persisted grant context.

use idadmin_core::event::{DomainEvent, EventContext, EventMetadata};
use serde::{Deserialize, Serialize};

/// Emitted when a grant is revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedGrantRemoved {
    /// The revoked grant.
    pub key: String,
}

/// Event type identifier for [`PersistedGrantRemoved`].
pub const PERSISTED_GRANT_REMOVED_EVENT_TYPE: &str = "persisted_grant.removed";

/// Event payload variants for the persisted grant context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PersistedGrantEventKind {
    /// A grant was revoked.
    Removed(PersistedGrantRemoved),
}

/// Domain event envelope for the persisted grant context.
#[derive(Debug, Clone)]
pub struct PersistedGrantEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: PersistedGrantEventKind,
}

impl PersistedGrantEvent {
    /// Wraps `kind` with metadata for the completed command.
    #[must_use]
    pub fn new(kind: PersistedGrantEventKind, context: EventContext) -> Self {
        let PersistedGrantEventKind::Removed(removed) = &kind;
        Self {
            metadata: EventMetadata::new(PERSISTED_GRANT_REMOVED_EVENT_TYPE, &removed.key, context),
            kind,
        }
    }
}

impl DomainEvent for PersistedGrantEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            PersistedGrantEventKind::Removed(_) => PERSISTED_GRANT_REMOVED_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
