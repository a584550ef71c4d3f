//! Routes for the identity resource context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use idadmin_identity_resource::application::query_handlers;
use idadmin_identity_resource::domain::aggregates::IdentityResource;
use idadmin_identity_resource::domain::commands::{
    RegisterIdentityResource, RemoveIdentityResource, UpdateIdentityResource,
};
use uuid::Uuid;

use super::Accepted;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/identity-resources
async fn list(State(state): State<AppState>) -> Result<Json<Vec<IdentityResource>>, ApiError> {
    let scope = state.reader();
    Ok(Json(query_handlers::list_identity_resources(&*scope).await?))
}

/// GET /api/v1/identity-resources/{name}
async fn get_resource(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<IdentityResource>, ApiError> {
    let scope = state.reader();
    Ok(Json(
        query_handlers::get_identity_resource(&name, &*scope).await?,
    ))
}

/// POST /api/v1/identity-resources
async fn register(
    State(state): State<AppState>,
    Json(resource): Json<IdentityResource>,
) -> Result<Json<Accepted>, ApiError> {
    let name = resource.name.clone();
    state
        .dispatch(RegisterIdentityResource {
            correlation_id: Uuid::new_v4(),
            resource,
        })
        .await?;
    Ok(Accepted::json(name))
}

/// PUT /api/v1/identity-resources/{name}
async fn update(
    State(state): State<AppState>,
    Path(old_name): Path<String>,
    Json(resource): Json<IdentityResource>,
) -> Result<Json<Accepted>, ApiError> {
    let name = resource.name.clone();
    state
        .dispatch(UpdateIdentityResource {
            correlation_id: Uuid::new_v4(),
            old_name,
            resource,
        })
        .await?;
    Ok(Accepted::json(name))
}

/// DELETE /api/v1/identity-resources/{name}
async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch(RemoveIdentityResource {
            correlation_id: Uuid::new_v4(),
            name,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for the identity resource context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(register))
        .route("/{name}", get(get_resource).put(update).delete(remove))
}
