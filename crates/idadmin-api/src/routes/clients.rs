//! Routes for the client context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use idadmin_client::application::query_handlers::{self, ClientSummary, ClientView};
use idadmin_client::domain::aggregates::{
    ClientClaim, ClientProperty, ClientSettings, ClientType, copy_id,
};
use idadmin_client::domain::commands::{
    CopyClient, RemoveClient, RemoveClientClaim, RemoveClientProperty, RemoveClientSecret,
    SaveClient, SaveClientClaim, SaveClientProperty, SaveClientSecret, UpdateClient,
};
use idadmin_core::secret::NewSecret;
use serde::Deserialize;
use uuid::Uuid;

use super::Accepted;
use super::api_resources::SecretKey;
use crate::error::ApiError;
use crate::state::AppState;

/// Body of a client creation: the settings plus the preset to apply.
#[derive(Debug, Deserialize)]
pub struct NewClient {
    /// Settings as entered.
    #[serde(flatten)]
    pub client: ClientSettings,
    /// Preset filling grant types and flags.
    #[serde(default)]
    pub client_type: ClientType,
}

/// GET /api/v1/clients
async fn list(State(state): State<AppState>) -> Result<Json<Vec<ClientSummary>>, ApiError> {
    let scope = state.reader();
    Ok(Json(query_handlers::list_clients(&*scope).await?))
}

/// GET /api/v1/clients/{client_id}
async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<ClientView>, ApiError> {
    let scope = state.reader();
    Ok(Json(query_handlers::get_client(&client_id, &*scope).await?))
}

/// POST /api/v1/clients
async fn save(
    State(state): State<AppState>,
    Json(body): Json<NewClient>,
) -> Result<Json<Accepted>, ApiError> {
    let client_id = body.client.client_id.clone();
    state
        .dispatch(SaveClient {
            correlation_id: Uuid::new_v4(),
            client: body.client,
            client_type: body.client_type,
        })
        .await?;
    Ok(Accepted::json(client_id))
}

/// PUT /api/v1/clients/{client_id}
async fn update(
    State(state): State<AppState>,
    Path(old_client_id): Path<String>,
    Json(client): Json<ClientSettings>,
) -> Result<Json<Accepted>, ApiError> {
    let client_id = client.client_id.clone();
    state
        .dispatch(UpdateClient {
            correlation_id: Uuid::new_v4(),
            old_client_id,
            client,
        })
        .await?;
    Ok(Accepted::json(client_id))
}

/// DELETE /api/v1/clients/{client_id}
async fn remove(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch(RemoveClient {
            correlation_id: Uuid::new_v4(),
            client_id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/clients/{client_id}/copy
async fn copy(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<Accepted>, ApiError> {
    let copied_id = copy_id(&client_id);
    state
        .dispatch(CopyClient {
            correlation_id: Uuid::new_v4(),
            client_id,
        })
        .await?;
    Ok(Accepted::json(copied_id))
}

/// POST /api/v1/clients/{client_id}/secrets
async fn save_secret(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(secret): Json<NewSecret>,
) -> Result<Json<Accepted>, ApiError> {
    state
        .dispatch(SaveClientSecret {
            correlation_id: Uuid::new_v4(),
            client_id: client_id.clone(),
            secret,
        })
        .await?;
    Ok(Accepted::json(client_id))
}

/// DELETE /api/v1/clients/{client_id}/secrets
async fn remove_secret(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(key): Json<SecretKey>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch(RemoveClientSecret {
            correlation_id: Uuid::new_v4(),
            client_id,
            secret_type: key.secret_type,
            value: key.value,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/clients/{client_id}/claims
async fn save_claim(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(claim): Json<ClientClaim>,
) -> Result<Json<Accepted>, ApiError> {
    state
        .dispatch(SaveClientClaim {
            correlation_id: Uuid::new_v4(),
            client_id: client_id.clone(),
            claim,
        })
        .await?;
    Ok(Accepted::json(client_id))
}

/// DELETE /api/v1/clients/{client_id}/claims
async fn remove_claim(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(claim): Json<ClientClaim>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch(RemoveClientClaim {
            correlation_id: Uuid::new_v4(),
            client_id,
            claim_type: claim.claim_type,
            value: claim.value,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/clients/{client_id}/properties
async fn save_property(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(property): Json<ClientProperty>,
) -> Result<Json<Accepted>, ApiError> {
    state
        .dispatch(SaveClientProperty {
            correlation_id: Uuid::new_v4(),
            client_id: client_id.clone(),
            property,
        })
        .await?;
    Ok(Accepted::json(client_id))
}

/// DELETE /api/v1/clients/{client_id}/properties
async fn remove_property(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(property): Json<ClientProperty>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch(RemoveClientProperty {
            correlation_id: Uuid::new_v4(),
            client_id,
            key: property.key,
            value: property.value,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for the client context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(save))
        .route("/{client_id}", get(get_client).put(update).delete(remove))
        .route("/{client_id}/copy", post(copy))
        .route("/{client_id}/secrets", post(save_secret).delete(remove_secret))
        .route("/{client_id}/claims", post(save_claim).delete(remove_claim))
        .route(
            "/{client_id}/properties",
            post(save_property).delete(remove_property),
        )
}
