//! Read-only audit trail.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::audit::AuditEntry;
use crate::state::AppState;

/// GET /api/v1/audit
async fn list_entries(State(state): State<AppState>) -> Json<Vec<AuditEntry>> {
    Json(state.audit.entries())
}

/// Returns the router for the audit trail.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_entries))
}
