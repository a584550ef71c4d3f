//! Domain events for the client context.

use idadmin_core::event::{DomainEvent, EventContext, EventMetadata};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{ClientClaim, ClientSettings, ClientType};

/// Emitted when a client is saved for the first time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSaved {
    /// The stored settings, preset applied.
    pub client: ClientSettings,
    /// The preset used.
    pub client_type: ClientType,
}

/// Emitted when a client's settings are replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientUpdated {
    /// The id before the update.
    pub old_client_id: String,
    /// The new settings.
    pub client: ClientSettings,
}

/// Emitted when a client is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRemoved {
    /// The removed client.
    pub client_id: String,
}

/// Emitted when a client is copied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCopied {
    /// The client that was copied.
    pub source_client_id: String,
    /// The id of the copy.
    pub client_id: String,
}

/// Emitted when a secret is added to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSecretSaved {
    /// The owning client.
    pub client_id: String,
    /// Secret discriminator. The value is never published.
    pub secret_type: String,
}

/// Emitted when a secret is removed from a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSecretRemoved {
    /// The owning client.
    pub client_id: String,
    /// Secret discriminator.
    pub secret_type: String,
}

/// Emitted when a claim is added to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientClaimSaved {
    /// The owning client.
    pub client_id: String,
    /// The new claim.
    pub claim: ClientClaim,
}

/// Emitted when a claim is removed from a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientClaimRemoved {
    /// The owning client.
    pub client_id: String,
    /// Claim type of the removed claim.
    pub claim_type: String,
}

/// Emitted when a property is added to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientPropertySaved {
    /// The owning client.
    pub client_id: String,
    /// Property key.
    pub key: String,
}

/// Emitted when a property is removed from a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientPropertyRemoved {
    /// The owning client.
    pub client_id: String,
    /// Property key.
    pub key: String,
}

/// Event type identifier for [`ClientSaved`].
pub const CLIENT_SAVED_EVENT_TYPE: &str = "client.saved";
/// Event type identifier for [`ClientUpdated`].
pub const CLIENT_UPDATED_EVENT_TYPE: &str = "client.updated";
/// Event type identifier for [`ClientRemoved`].
pub const CLIENT_REMOVED_EVENT_TYPE: &str = "client.removed";
/// Event type identifier for [`ClientCopied`].
pub const CLIENT_COPIED_EVENT_TYPE: &str = "client.copied";
/// Event type identifier for [`ClientSecretSaved`].
pub const CLIENT_SECRET_SAVED_EVENT_TYPE: &str = "client.secret_saved";
/// Event type identifier for [`ClientSecretRemoved`].
pub const CLIENT_SECRET_REMOVED_EVENT_TYPE: &str = "client.secret_removed";
/// Event type identifier for [`ClientClaimSaved`].
pub const CLIENT_CLAIM_SAVED_EVENT_TYPE: &str = "client.claim_saved";
/// Event type identifier for [`ClientClaimRemoved`].
pub const CLIENT_CLAIM_REMOVED_EVENT_TYPE: &str = "client.claim_removed";
/// Event type identifier for [`ClientPropertySaved`].
pub const CLIENT_PROPERTY_SAVED_EVENT_TYPE: &str = "client.property_saved";
/// Event type identifier for [`ClientPropertyRemoved`].
pub const CLIENT_PROPERTY_REMOVED_EVENT_TYPE: &str = "client.property_removed";

/// Event payload variants for the client context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientEventKind {
    /// A client was saved.
    Saved(ClientSaved),
    /// A client was updated.
    Updated(ClientUpdated),
    /// A client was removed.
    Removed(ClientRemoved),
    /// A client was copied.
    Copied(ClientCopied),
    /// A secret was saved.
    SecretSaved(ClientSecretSaved),
    /// A secret was removed.
    SecretRemoved(ClientSecretRemoved),
    /// A claim was saved.
    ClaimSaved(ClientClaimSaved),
    /// A claim was removed.
    ClaimRemoved(ClientClaimRemoved),
    /// A property was saved.
    PropertySaved(ClientPropertySaved),
    /// A property was removed.
    PropertyRemoved(ClientPropertyRemoved),
}

impl ClientEventKind {
    /// The routing name of this variant.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Saved(_) => CLIENT_SAVED_EVENT_TYPE,
            Self::Updated(_) => CLIENT_UPDATED_EVENT_TYPE,
            Self::Removed(_) => CLIENT_REMOVED_EVENT_TYPE,
            Self::Copied(_) => CLIENT_COPIED_EVENT_TYPE,
            Self::SecretSaved(_) => CLIENT_SECRET_SAVED_EVENT_TYPE,
            Self::SecretRemoved(_) => CLIENT_SECRET_REMOVED_EVENT_TYPE,
            Self::ClaimSaved(_) => CLIENT_CLAIM_SAVED_EVENT_TYPE,
            Self::ClaimRemoved(_) => CLIENT_CLAIM_REMOVED_EVENT_TYPE,
            Self::PropertySaved(_) => CLIENT_PROPERTY_SAVED_EVENT_TYPE,
            Self::PropertyRemoved(_) => CLIENT_PROPERTY_REMOVED_EVENT_TYPE,
        }
    }

    /// The client the event concerns, after the change. For a copy this is
    /// the new client.
    #[must_use]
    pub fn client_id(&self) -> &str {
        match self {
            Self::Saved(e) => &e.client.client_id,
            Self::Updated(e) => &e.client.client_id,
            Self::Removed(e) => &e.client_id,
            Self::Copied(e) => &e.client_id,
            Self::SecretSaved(e) => &e.client_id,
            Self::SecretRemoved(e) => &e.client_id,
            Self::ClaimSaved(e) => &e.client_id,
            Self::ClaimRemoved(e) => &e.client_id,
            Self::PropertySaved(e) => &e.client_id,
            Self::PropertyRemoved(e) => &e.client_id,
        }
    }
}

/// Domain event envelope for the client context.
#[derive(Debug, Clone)]
pub struct ClientEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ClientEventKind,
}

impl ClientEvent {
    /// Wraps `kind` with metadata for the completed command.
    #[must_use]
    pub fn new(kind: ClientEventKind, context: EventContext) -> Self {
        Self {
            metadata: EventMetadata::new(kind.event_type(), kind.client_id(), context),
            kind,
        }
    }
}

impl DomainEvent for ClientEvent {
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
