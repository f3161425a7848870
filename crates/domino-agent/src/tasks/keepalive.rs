//! Keep-alive loop.
//!
//! The agent pings on a fixed interval and expects a pong within the pong
//! timeout. A missed pong means the link is effectively dead even if TCP
//! has not noticed yet, so the loop raises a fatal error and the process
//! exits; external supervision reconnects by restarting the agent.

use std::sync::Arc;

use async_trait::async_trait;

use domino_proto::{Envelope, MessageType};

use crate::context::{CoordinatorLink, LinkState, TaskContext};
use crate::error::AgentError;
use crate::pipeline::{Task, TaskStatus};

/// Schedules the periodic ping/pong watchdog.
pub struct KeepAliveTask;

#[async_trait]
impl Task for KeepAliveTask {
    fn name(&self) -> &'static str {
        "keep-alive"
    }

    async fn run(&self, ctx: &mut TaskContext) -> TaskStatus {
        let Some(link) = ctx.connection.clone() else {
            tracing::error!("Keep-alive requires an established connection");
            return TaskStatus::Failed;
        };

        tokio::spawn(keep_alive_loop(
            link,
            Arc::clone(&ctx.link_state),
            ctx.fatal.clone(),
            ctx.config.ping_interval(),
            ctx.config.pong_timeout(),
        ));
        TaskStatus::Scheduled
    }
}

async fn keep_alive_loop(
    link: CoordinatorLink,
    state: Arc<LinkState>,
    fatal: tokio::sync::mpsc::Sender<AgentError>,
    interval: std::time::Duration,
    pong_timeout: std::time::Duration,
) {
    loop {
        tokio::time::sleep(interval).await;

        state.set_ping_confirmed(false);
        if link
            .send_envelope(&Envelope::empty(MessageType::Ping))
            .await
            .is_err()
        {
            let _ = fatal.send(AgentError::LinkClosed).await;
            return;
        }
        tracing::debug!("Ping sent");

        tokio::time::sleep(pong_timeout).await;
        if !state.ping_confirmed() {
            tracing::error!(?pong_timeout, "Ping not confirmed within timeout");
            let _ = fatal.send(AgentError::PingNotConfirmed).await;
            return;
        }
    }
}
