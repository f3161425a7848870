//! Agent identity and connection registry.
//!
//! Maps live connections to known-agent identities. Announcements are matched
//! against the statically configured known-agents list by the full
//! `{agent_key, host_id, source_type}` triple; anything else is rejected and
//! the caller must terminate the connection before dispatching further
//! messages. Bindings are in-memory only — a reconnecting agent re-announces.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use domino_core::AgentIdentity;
use domino_proto::AnnouncementPayload;

use crate::connection::{ConnectionHandle, ConnectionId};

/// Outcome of tracking an announcement.
#[derive(Debug, Clone)]
pub enum TrackOutcome {
    /// The triple matched a known agent; the connection is now bound to it.
    Tracked(AgentIdentity),
    /// No known agent matched; the connection must be terminated.
    Rejected,
}

/// One live connection↔agent binding.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The bound agent identity.
    pub identity: AgentIdentity,
    /// Outbound handle for the bound connection.
    pub handle: ConnectionHandle,
    /// When the binding was created.
    pub connected_at: DateTime<Utc>,
}

/// The coordinator's agent registry.
#[derive(Debug)]
pub struct AgentRegistry {
    known: Vec<AgentIdentity>,
    bindings: RwLock<HashMap<ConnectionId, Binding>>,
}

impl AgentRegistry {
    /// Create a registry over the configured known-agents list.
    #[must_use]
    pub fn new(known: Vec<AgentIdentity>) -> Self {
        Self {
            known,
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Match an announcement against the known-agents list and bind the
    /// connection on success.
    ///
    /// Re-announcement on an already-bound connection overwrites the binding,
    /// which supports agent reconnect churn without a coordinator restart.
    pub fn track_agent(
        &self,
        announcement: &AnnouncementPayload,
        handle: ConnectionHandle,
    ) -> TrackOutcome {
        let Some(identity) = self.known.iter().find(|agent| {
            agent.agent_key == announcement.agent_key
                && agent.host_id == announcement.host_id
                && agent.source_type == announcement.source_type
        }) else {
            tracing::warn!(
                agent_key = %announcement.agent_key,
                host_id = %announcement.host_id,
                source_type = %announcement.source_type,
                "Rejected announcement from unknown agent"
            );
            return TrackOutcome::Rejected;
        };

        let binding = Binding {
            identity: identity.clone(),
            handle,
            connected_at: Utc::now(),
        };
        let connection = binding.handle.id();
        self.bindings.write().insert(connection, binding);

        tracing::info!(
            agent_id = %identity.agent_id(),
            connection = %connection,
            "Agent tracked"
        );
        TrackOutcome::Tracked(identity.clone())
    }

    /// Look up the agent bound to a connection.
    #[must_use]
    pub fn identify_agent(&self, connection: ConnectionId) -> Option<AgentIdentity> {
        self.bindings
            .read()
            .get(&connection)
            .map(|binding| binding.identity.clone())
    }

    /// Remove the binding for a connection.
    ///
    /// Safe to call for a connection that was never tracked.
    pub fn mark_agent_disconnected(&self, connection: ConnectionId) {
        if let Some(binding) = self.bindings.write().remove(&connection) {
            tracing::info!(
                agent_id = %binding.identity.agent_id(),
                connection = %connection,
                "Agent disconnected"
            );
        }
    }

    /// Resolve the outbound handle for a tracked agent.
    ///
    /// If an agent reconnected without its old socket closing yet, the most
    /// recent binding wins.
    #[must_use]
    pub fn connection_for(&self, identity: &AgentIdentity) -> Option<ConnectionHandle> {
        self.bindings
            .read()
            .values()
            .filter(|binding| binding.identity == *identity)
            .max_by_key(|binding| binding.connected_at)
            .map(|binding| binding.handle.clone())
    }

    /// Find a known agent by its key.
    #[must_use]
    pub fn find_known(&self, agent_key: &str) -> Option<AgentIdentity> {
        self.known
            .iter()
            .find(|agent| agent.agent_key == agent_key)
            .cloned()
    }

    /// The configured known-agents list.
    #[must_use]
    pub fn known_agents(&self) -> &[AgentIdentity] {
        &self.known
    }

    /// When the given agent's live binding was created, if any.
    #[must_use]
    pub fn connected_since(&self, identity: &AgentIdentity) -> Option<DateTime<Utc>> {
        self.bindings
            .read()
            .values()
            .filter(|binding| binding.identity == *identity)
            .map(|binding| binding.connected_at)
            .max()
    }

    /// Number of live bindings.
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.bindings.read().len()
    }
}
