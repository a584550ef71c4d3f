//! Aggregate roots for the persisted grant context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A grant stored by the identity provider, addressed by its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedGrant {
    /// Natural key.
    pub key: String,
    /// Grant kind, e.g. `refresh_token` or `user_consent`.
    pub grant_type: String,
    /// The user the grant was issued to.
    pub subject_id: String,
    /// The client the grant was issued for.
    pub client_id: String,
    /// Issue time.
    pub creation_time: DateTime<Utc>,
    /// Expiry, if any.
    pub expiration: Option<DateTime<Utc>>,
    /// Serialized grant contents.
    pub data: String,
}
