//! Identity announcement.

use async_trait::async_trait;

use domino_proto::{AnnouncementPayload, Envelope, MessageType};

use crate::context::{AgentStatus, TaskContext};
use crate::pipeline::{Task, TaskStatus};

/// Sends the agent's identity triple over the fresh connection.
///
/// The coordinator answers with `CONFIRMATION` (handled by the read loop)
/// or closes the connection if the triple is not in its known set.
pub struct AnnounceTask;

#[async_trait]
impl Task for AnnounceTask {
    fn name(&self) -> &'static str {
        "announce"
    }

    async fn run(&self, ctx: &mut TaskContext) -> TaskStatus {
        let Some(link) = &ctx.connection else {
            tracing::error!("Announce requires an established connection");
            return TaskStatus::Failed;
        };

        let payload = AnnouncementPayload {
            agent_key: ctx.config.agent_key.clone(),
            host_id: ctx.config.host_id.clone(),
            source_type: ctx.config.source_type,
        };

        let envelope = match Envelope::new(MessageType::Announcement, &payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!(error = %err, "Failed to build announcement");
                return TaskStatus::Failed;
            }
        };

        if let Err(err) = link.send_envelope(&envelope).await {
            tracing::error!(error = %err, "Failed to send announcement");
            return TaskStatus::Failed;
        }

        ctx.link_state.set_status(AgentStatus::Announced);
        tracing::info!(agent_id = %ctx.config.agent_id(), "Announcement sent");
        TaskStatus::Done
    }
}
