//! Domain events for the API resource context.

use idadmin_core::event::{DomainEvent, EventContext, EventMetadata};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{ApiResourceFields, ApiScope};

/// Emitted when an API resource is registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResourceRegistered {
    /// The registered fields.
    pub resource: ApiResourceFields,
}

/// Emitted when an API resource's fields are replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResourceUpdated {
    /// The name before the update.
    pub old_name: String,
    /// The new state.
    pub resource: ApiResourceFields,
}

/// Emitted when an API resource is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResourceRemoved {
    /// The removed resource.
    pub name: String,
}

/// Emitted when a secret is added to an API resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSecretSaved {
    /// The owning resource.
    pub resource_name: String,
    /// Secret discriminator. The value is never published.
    pub secret_type: String,
}

/// Emitted when a secret is removed from an API resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSecretRemoved {
    /// The owning resource.
    pub resource_name: String,
    /// Secret discriminator.
    pub secret_type: String,
}

/// Emitted when a scope is added to an API resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiScopeSaved {
    /// The owning resource.
    pub resource_name: String,
    /// The new scope.
    pub scope: ApiScope,
}

/// Emitted when a scope is removed from an API resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiScopeRemoved {
    /// The owning resource.
    pub resource_name: String,
    /// The removed scope.
    pub name: String,
}

/// Event type identifier for [`ApiResourceRegistered`].
pub const API_RESOURCE_REGISTERED_EVENT_TYPE: &str = "api_resource.registered";

/// Event type identifier for [`ApiResourceUpdated`].
pub const API_RESOURCE_UPDATED_EVENT_TYPE: &str = "api_resource.updated";

/// Event type identifier for [`ApiResourceRemoved`].
pub const API_RESOURCE_REMOVED_EVENT_TYPE: &str = "api_resource.removed";

/// Event type identifier for [`ApiSecretSaved`].
pub const API_SECRET_SAVED_EVENT_TYPE: &str = "api_resource.secret_saved";

/// Event type identifier for [`ApiSecretRemoved`].
pub const API_SECRET_REMOVED_EVENT_TYPE: &str = "api_resource.secret_removed";

/// Event type identifier for [`ApiScopeSaved`].
pub const API_SCOPE_SAVED_EVENT_TYPE: &str = "api_resource.scope_saved";

/// Event type identifier for [`ApiScopeRemoved`].
pub const API_SCOPE_REMOVED_EVENT_TYPE: &str = "api_resource.scope_removed";

/// Event payload variants for the API resource context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ApiResourceEventKind {
    /// A resource was registered.
    Registered(ApiResourceRegistered),
    /// A resource was updated.
    Updated(ApiResourceUpdated),
    /// A resource was removed.
    Removed(ApiResourceRemoved),
    /// A secret was saved.
    SecretSaved(ApiSecretSaved),
    /// A secret was removed.
    SecretRemoved(ApiSecretRemoved),
    /// A scope was saved.
    ScopeSaved(ApiScopeSaved),
    /// A scope was removed.
    ScopeRemoved(ApiScopeRemoved),
}

impl ApiResourceEventKind {
    /// The routing name of this variant.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Registered(_) => API_RESOURCE_REGISTERED_EVENT_TYPE,
            Self::Updated(_) => API_RESOURCE_UPDATED_EVENT_TYPE,
            Self::Removed(_) => API_RESOURCE_REMOVED_EVENT_TYPE,
            Self::SecretSaved(_) => API_SECRET_SAVED_EVENT_TYPE,
            Self::SecretRemoved(_) => API_SECRET_REMOVED_EVENT_TYPE,
            Self::ScopeSaved(_) => API_SCOPE_SAVED_EVENT_TYPE,
            Self::ScopeRemoved(_) => API_SCOPE_REMOVED_EVENT_TYPE,
        }
    }

    /// Natural key of the resource the event concerns, after the change.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        match self {
            Self::Registered(e) => &e.resource.name,
            Self::Updated(e) => &e.resource.name,
            Self::Removed(e) => &e.name,
            Self::SecretSaved(e) => &e.resource_name,
            Self::SecretRemoved(e) => &e.resource_name,
            Self::ScopeSaved(e) => &e.resource_name,
            Self::ScopeRemoved(e) => &e.resource_name,
        }
    }
}

/// Domain event envelope for the API resource context.
#[derive(Debug, Clone)]
pub struct ApiResourceEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ApiResourceEventKind,
}

impl ApiResourceEvent {
    /// Wraps `kind` with metadata for the completed command.
    #[must_use]
    pub fn new(kind: ApiResourceEventKind, context: EventContext) -> Self {
        Self {
            metadata: EventMetadata::new(kind.event_type(), kind.resource_name(), context),
            kind,
        }
    }
}

impl DomainEvent for ApiResourceEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Plain derived structs with string keys always serialize.
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
