//! Routes for the API resource context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use idadmin_api_resource::application::query_handlers::{
    self, ApiResourceSummary, ApiResourceView,
};
use idadmin_api_resource::domain::aggregates::{ApiResourceFields, ApiScope};
use idadmin_api_resource::domain::commands::{
    RegisterApiResource, RemoveApiResource, RemoveApiScope, RemoveApiSecret, SaveApiScope,
    SaveApiSecret, UpdateApiResource,
};
use idadmin_core::secret::NewSecret;
use serde::Deserialize;
use uuid::Uuid;

use super::Accepted;
use crate::error::ApiError;
use crate::state::AppState;

/// Identifies a stored secret for removal.
#[derive(Debug, Deserialize)]
pub struct SecretKey {
    /// Discriminator.
    pub secret_type: String,
    /// Stored value, i.e. the digest for hashed secrets.
    pub value: String,
}

/// GET /api/v1/api-resources
async fn list(State(state): State<AppState>) -> Result<Json<Vec<ApiResourceSummary>>, ApiError> {
    let scope = state.reader();
    let summaries = query_handlers::list_api_resources(&*scope).await?;
    Ok(Json(summaries))
}

/// GET /api/v1/api-resources/{name}
async fn get_resource(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResourceView>, ApiError> {
    let scope = state.reader();
    let view = query_handlers::get_api_resource(&name, &*scope).await?;
    Ok(Json(view))
}

/// POST /api/v1/api-resources
async fn register(
    State(state): State<AppState>,
    Json(resource): Json<ApiResourceFields>,
) -> Result<Json<Accepted>, ApiError> {
    let name = resource.name.clone();
    state
        .dispatch(RegisterApiResource {
            correlation_id: Uuid::new_v4(),
            resource,
        })
        .await?;
    Ok(Accepted::json(name))
}

/// PUT /api/v1/api-resources/{name}
async fn update(
    State(state): State<AppState>,
    Path(old_name): Path<String>,
    Json(resource): Json<ApiResourceFields>,
) -> Result<Json<Accepted>, ApiError> {
    let name = resource.name.clone();
    state
        .dispatch(UpdateApiResource {
            correlation_id: Uuid::new_v4(),
            old_name,
            resource,
        })
        .await?;
    Ok(Accepted::json(name))
}

/// DELETE /api/v1/api-resources/{name}
async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch(RemoveApiResource {
            correlation_id: Uuid::new_v4(),
            name,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/api-resources/{name}/secrets
async fn save_secret(
    State(state): State<AppState>,
    Path(resource_name): Path<String>,
    Json(secret): Json<NewSecret>,
) -> Result<Json<Accepted>, ApiError> {
    state
        .dispatch(SaveApiSecret {
            correlation_id: Uuid::new_v4(),
            resource_name: resource_name.clone(),
            secret,
        })
        .await?;
    Ok(Accepted::json(resource_name))
}

/// DELETE /api/v1/api-resources/{name}/secrets
async fn remove_secret(
    State(state): State<AppState>,
    Path(resource_name): Path<String>,
    Json(key): Json<SecretKey>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch(RemoveApiSecret {
            correlation_id: Uuid::new_v4(),
            resource_name,
            secret_type: key.secret_type,
            value: key.value,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/api-resources/{name}/scopes
async fn save_scope(
    State(state): State<AppState>,
    Path(resource_name): Path<String>,
    Json(scope): Json<ApiScope>,
) -> Result<Json<Accepted>, ApiError> {
    state
        .dispatch(SaveApiScope {
            correlation_id: Uuid::new_v4(),
            resource_name: resource_name.clone(),
            scope,
        })
        .await?;
    Ok(Accepted::json(resource_name))
}

/// DELETE /api/v1/api-resources/{name}/scopes/{scope}
async fn remove_scope(
    State(state): State<AppState>,
    Path((resource_name, name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch(RemoveApiScope {
            correlation_id: Uuid::new_v4(),
            resource_name,
            name,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for the API resource context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(register))
        .route("/{name}", get(get_resource).put(update).delete(remove))
        .route("/{name}/secrets", post(save_secret).delete(remove_secret))
        .route("/{name}/scopes", post(save_scope))
        .route("/{name}/scopes/{scope}", delete(remove_scope))
}
