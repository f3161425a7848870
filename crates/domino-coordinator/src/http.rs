//! Admin HTTP endpoints.
//!
//! A thin REST surface over the registries: a public health probe, a
//! paginated known-agents listing, and a command trigger that awaits the
//! terminal operation result.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use domino_core::{LifecycleCommand, OperationResult, Page, SourceType};

use crate::error::CoordinatorError;
use crate::state::CoordinatorState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check handler. Public, unauthenticated.
pub async fn health() -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    };

    (StatusCode::OK, Json(response))
}

/// One known agent in the admin listing.
#[derive(Debug, Serialize)]
pub struct AgentView {
    /// Derived agent URI.
    #[serde(rename = "agentID")]
    pub agent_id: String,
    /// The configured key.
    #[serde(rename = "agentKey")]
    pub agent_key: String,
    /// The host the agent runs on.
    #[serde(rename = "hostID")]
    pub host_id: String,
    /// The runtime kind.
    #[serde(rename = "sourceType")]
    pub source_type: SourceType,
    /// Whether a live tracked connection exists.
    pub connected: bool,
    /// When the live binding was created, if connected.
    #[serde(rename = "connectedAt", skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    /// 1-based page index.
    #[serde(default = "PageParams::default_page")]
    pub page: usize,
    /// Page size.
    #[serde(default = "PageParams::default_limit")]
    pub limit: usize,
}

impl PageParams {
    const fn default_page() -> usize {
        1
    }

    const fn default_limit() -> usize {
        20
    }
}

/// List the configured known agents with their connection state.
pub async fn list_agents(
    State(state): State<Arc<CoordinatorState>>,
    Query(params): Query<PageParams>,
) -> Json<Page<AgentView>> {
    let agents: Vec<AgentView> = state
        .registry
        .known_agents()
        .iter()
        .map(|identity| {
            let connected_at = state.registry.connected_since(identity);
            AgentView {
                agent_id: identity.agent_id(),
                agent_key: identity.agent_key.clone(),
                host_id: identity.host_id.clone(),
                source_type: identity.source_type,
                connected: connected_at.is_some(),
                connected_at,
            }
        })
        .collect();

    Json(Page::slice(agents, params.page, params.limit))
}

/// Request body for triggering a lifecycle command.
#[derive(Debug, Deserialize)]
pub struct CommandBody {
    /// The command to execute.
    pub command: LifecycleCommand,
    /// The deployment the command targets.
    pub deployment: String,
    /// Version to deploy; required for `DEPLOY`.
    #[serde(default)]
    pub version: Option<String>,
}

/// Send a lifecycle command to an agent and await its terminal result.
///
/// The response always carries a terminal status (success, a domain failure,
/// or `TIMEOUT`) within the configured operation timeout.
pub async fn send_command(
    State(state): State<Arc<CoordinatorState>>,
    Path(agent_key): Path<String>,
    Json(body): Json<CommandBody>,
) -> Result<Json<OperationResult>, CoordinatorError> {
    if body.deployment.is_empty() {
        return Err(CoordinatorError::BadRequest("deployment is required".to_string()));
    }
    if body.command == LifecycleCommand::Deploy && body.version.is_none() {
        return Err(CoordinatorError::BadRequest(
            "version is required for DEPLOY".to_string(),
        ));
    }

    let result = state
        .fleet
        .send_command(&agent_key, body.command, &body.deployment, body.version)
        .await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoordinatorConfig;
    use domino_core::AgentIdentity;

    fn state() -> Arc<CoordinatorState> {
        let config = CoordinatorConfig {
            known_agents: vec![
                AgentIdentity::new("k1", "h1", SourceType::Docker),
                AgentIdentity::new("k2", "h2", SourceType::Service),
            ],
            ..CoordinatorConfig::default()
        };
        Arc::new(CoordinatorState::new(config))
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn list_agents_reports_disconnected_fleet() {
        let Json(page) = list_agents(
            State(state()),
            Query(PageParams { page: 1, limit: 20 }),
        )
        .await;

        assert_eq!(page.total_items, 2);
        assert_eq!(page.items.len(), 2);
        assert!(!page.items[0].connected);
        assert!(page.items[0].connected_at.is_none());
        assert_eq!(page.items[0].agent_id, "domino-agent://h1/docker/k1");
    }

    #[tokio::test]
    async fn list_agents_paginates() {
        let Json(page) = list_agents(
            State(state()),
            Query(PageParams { page: 2, limit: 1 }),
        )
        .await;

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].agent_key, "k2");
        assert!(page.has_previous);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn command_for_unknown_agent_is_not_found() {
        let result = send_command(
            State(state()),
            Path("ghost".to_string()),
            Json(CommandBody {
                command: LifecycleCommand::Start,
                deployment: "app".to_string(),
                version: None,
            }),
        )
        .await;

        assert!(matches!(result, Err(CoordinatorError::UnknownAgent(_))));
    }

    #[tokio::test]
    async fn deploy_without_version_is_rejected() {
        let result = send_command(
            State(state()),
            Path("k1".to_string()),
            Json(CommandBody {
                command: LifecycleCommand::Deploy,
                deployment: "app".to_string(),
                version: None,
            }),
        )
        .await;

        assert!(matches!(result, Err(CoordinatorError::BadRequest(_))));
    }
}
