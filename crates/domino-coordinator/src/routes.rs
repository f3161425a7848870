//! Router configuration.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::http;
use crate::state::CoordinatorState;
use crate::ws;

/// Maximum admin request body size in bytes.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the coordinator router.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Agents (WebSocket, header-authenticated)
/// - `GET /agent/socket` - Persistent agent connection
///
/// ## Admin
/// - `GET /v1/agents` - Paginated known-agents listing
/// - `POST /v1/agents/:agent_key/commands` - Trigger a lifecycle command
pub fn create_router(state: Arc<CoordinatorState>) -> Router {
    Router::new()
        .route("/health", get(http::health))
        .route("/agent/socket", get(ws::agent_socket))
        .route("/v1/agents", get(http::list_agents))
        .route("/v1/agents/:agent_key/commands", post(http::send_command))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
