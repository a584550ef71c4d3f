//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name for subscriber routing.
    pub event_type: String,
    /// Natural key of the aggregate the event concerns.
    pub aggregate_id: String,
    /// Correlation ID of the command that produced the event.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Builds metadata for a freshly completed command.
    #[must_use]
    pub fn new(event_type: &str, aggregate_id: impl Into<String>, context: EventContext) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            aggregate_id: aggregate_id.into(),
            correlation_id: context.correlation_id,
            occurred_at: context.occurred_at,
        }
    }
}

/// Values the pipeline supplies when a handler builds its completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventContext {
    /// Correlation ID of the completed command.
    pub correlation_id: Uuid,
    /// Commit time as reported by the pipeline's clock.
    pub occurred_at: DateTime<Utc>,
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name (used for subscriber routing).
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;

    /// Natural key of the affected aggregate.
    fn aggregate_id(&self) -> &str {
        &self.metadata().aggregate_id
    }
}
