//! Domain events for the identity resource context.

use idadmin_core::event::{DomainEvent, EventContext, EventMetadata};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::IdentityResource;

/// Emitted when an identity resource is registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResourceRegistered {
    /// The new resource.
    pub resource: IdentityResource,
}

/// Emitted when an identity resource is replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResourceUpdated {
    /// The name before the update.
    pub old_name: String,
    /// The new state.
    pub resource: IdentityResource,
}

/// Emitted when an identity resource is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResourceRemoved {
    /// The removed resource.
    pub name: String,
}

/// Event type identifier for [`IdentityResourceRegistered`].
pub const IDENTITY_RESOURCE_REGISTERED_EVENT_TYPE: &str = "identity_resource.registered";

/// Event type identifier for [`IdentityResourceUpdated`].
pub const IDENTITY_RESOURCE_UPDATED_EVENT_TYPE: &str = "identity_resource.updated";

/// Event type identifier for [`IdentityResourceRemoved`].
pub const IDENTITY_RESOURCE_REMOVED_EVENT_TYPE: &str = "identity_resource.removed";

/// Event payload variants for the identity resource context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IdentityResourceEventKind {
    /// A resource was registered.
    Registered(IdentityResourceRegistered),
    /// A resource was updated.
    Updated(IdentityResourceUpdated),
    /// A resource was removed.
    Removed(IdentityResourceRemoved),
}

impl IdentityResourceEventKind {
    /// The routing name of this variant.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Registered(_) => IDENTITY_RESOURCE_REGISTERED_EVENT_TYPE,
            Self::Updated(_) => IDENTITY_RESOURCE_UPDATED_EVENT_TYPE,
            Self::Removed(_) => IDENTITY_RESOURCE_REMOVED_EVENT_TYPE,
        }
    }

    fn resource_name(&self) -> &str {
        match self {
            Self::Registered(e) => &e.resource.name,
            Self::Updated(e) => &e.resource.name,
            Self::Removed(e) => &e.name,
        }
    }
}

/// Domain event envelope for the identity resource context.
#[derive(Debug, Clone)]
pub struct IdentityResourceEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: IdentityResourceEventKind,
}

impl IdentityResourceEvent {
    /// Wraps `kind` with metadata for the completed command.
    #[must_use]
    pub fn new(kind: IdentityResourceEventKind, context: EventContext) -> Self {
        Self {
            metadata: EventMetadata::new(kind.event_type(), kind.resource_name(), context),
            kind,
        }
    }
}

impl DomainEvent for IdentityResourceEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
