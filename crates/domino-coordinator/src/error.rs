//! Coordinator error types and API responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// A result type using `CoordinatorError`.
pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// Errors that can occur in coordinator operations.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The agent key does not match any configured known agent.
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    /// The agent is known but has no live tracked connection.
    #[error("agent not connected: {0}")]
    AgentNotConnected(String),

    /// The connection closed before the outbound frame was flushed.
    #[error("connection closed")]
    ConnectionClosed,

    /// Invalid request body or parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Protocol encoding error.
    #[error("protocol error: {0}")]
    Proto(#[from] domino_proto::ProtoError),

    /// Internal coordinator error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Error details.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl CoordinatorError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownAgent(_) => StatusCode::NOT_FOUND,
            Self::AgentNotConnected(_) | Self::ConnectionClosed => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Proto(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownAgent(_) => "unknown_agent",
            Self::AgentNotConnected(_) => "agent_not_connected",
            Self::ConnectionClosed => "connection_closed",
            Self::BadRequest(_) => "bad_request",
            Self::Proto(_) => "protocol_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for CoordinatorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code, message, "Request failed");
        }

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}
