//! Handshake header construction.

use async_trait::async_trait;

use crate::context::TaskContext;
use crate::pipeline::{Task, TaskStatus};

/// Header names must be lowercase to satisfy `HeaderName::from_static`.
pub const API_KEY_HEADER: &str = "x-api-key";
pub const AGENT_ID_HEADER: &str = "x-agent-id";

/// Builds the authentication headers the connect task attaches to the
/// WebSocket upgrade request.
pub struct HeaderTask;

#[async_trait]
impl Task for HeaderTask {
    fn name(&self) -> &'static str {
        "auth-headers"
    }

    async fn run(&self, ctx: &mut TaskContext) -> TaskStatus {
        ctx.auth_headers = Some(vec![
            (API_KEY_HEADER, ctx.config.api_key.clone()),
            (AGENT_ID_HEADER, ctx.config.agent_id()),
        ]);
        TaskStatus::Done
    }
}
