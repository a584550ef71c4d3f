//! idadmin API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use idadmin_core::bus::BusError;
use idadmin_core::error::DomainError;
use idadmin_core::notification::Notification;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// JSON body returned when a command is rejected.
#[derive(Debug, Serialize)]
pub struct RejectionBody {
    /// Every notification raised for the request, in publication order.
    pub errors: Vec<Notification>,
}

/// Every way a request can fail, mapped to a status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A query or store call failed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The command was invalid or conflicted with stored state.
    #[error("command rejected with {} notification(s)", .0.len())]
    Rejected(Vec<Notification>),

    /// The store refused the commit or a repository call failed.
    #[error("command failed; no changes were saved")]
    Failed,

    /// The request was cancelled before the command committed.
    #[error("command cancelled")]
    Cancelled,

    /// No handler, or more than one, is wired for the command.
    #[error(transparent)]
    Bus(#[from] BusError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            Self::Rejected(notifications) => {
                let body = RejectionBody {
                    errors: notifications.clone(),
                };
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
            Self::Domain(DomainError::AggregateNotFound(_)) => {
                (StatusCode::NOT_FOUND, "aggregate_not_found")
            }
            Self::Domain(DomainError::Infrastructure(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
            Self::Failed => (StatusCode::INTERNAL_SERVER_ERROR, "command_failed"),
            Self::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "command_cancelled"),
            Self::Bus(_) => (StatusCode::INTERNAL_SERVER_ERROR, "wiring_error"),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
