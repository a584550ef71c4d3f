//! Route modules organized by bounded context.

pub mod api_resources;
pub mod audit;
pub mod clients;
pub mod health;
pub mod identity_resources;
pub mod persisted_grants;

use axum::Json;
use serde::Serialize;

/// Body returned when a command completes.
#[derive(Debug, Serialize)]
pub struct Accepted {
    /// Natural key of the aggregate the command changed.
    pub aggregate_id: String,
}

impl Accepted {
    pub(crate) fn json(aggregate_id: impl Into<String>) -> Json<Self> {
        Json(Self {
            aggregate_id: aggregate_id.into(),
        })
    }
}
