//! Routes for the persisted grant context.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use idadmin_persisted_grant::application::query_handlers::{self, GrantPage};
use idadmin_persisted_grant::domain::aggregates::PersistedGrant;
use idadmin_persisted_grant::domain::commands::RemovePersistedGrant;
use idadmin_persisted_grant::domain::repository::GrantSearch;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/persisted-grants?subject_id=&client_id=&offset=&limit=
async fn search(
    State(state): State<AppState>,
    Query(search): Query<GrantSearch>,
) -> Result<Json<GrantPage>, ApiError> {
    let scope = state.reader();
    Ok(Json(query_handlers::search_grants(&search, &*scope).await?))
}

/// GET /api/v1/persisted-grants/{key}
async fn get_grant(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<PersistedGrant>, ApiError> {
    let scope = state.reader();
    Ok(Json(query_handlers::get_grant(&key, &*scope).await?))
}

/// DELETE /api/v1/persisted-grants/{key}
async fn remove(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch(RemovePersistedGrant {
            correlation_id: Uuid::new_v4(),
            key,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for the persisted grant context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search))
        .route("/{key}", get(get_grant).delete(remove))
}
