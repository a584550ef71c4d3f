//! idadmin admin API.
//!
//! Exposes every administrative command over HTTP. Each request runs in
//! its own store scope; the outcome maps to `200`/`204` on success, `400`
//! with the request's notifications on rejection, `500` when nothing was
//! saved, and `503` when the request was cancelled.

pub mod audit;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// The full router, without transport layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/api-resources", routes::api_resources::router())
        .nest("/api/v1/clients", routes::clients::router())
        .nest("/api/v1/identity-resources", routes::identity_resources::router())
        .nest("/api/v1/persisted-grants", routes::persisted_grants::router())
        .nest("/api/v1/audit", routes::audit::router())
        .with_state(state)
}
