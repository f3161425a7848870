//! In-flight operation correlation and timeout registry.
//!
//! Turns the asynchronous, best-effort message exchange into a future-based
//! request/response API with a bounded wait. Each sent command registers a
//! pending entry keyed by its correlation ID; a matching `RESULT` or
//! `FAILURE` envelope resolves the entry exactly once, and a per-operation
//! watchdog resolves it with `TIMEOUT` if the deadline elapses first. Late or
//! duplicate messages find no entry and are logged and discarded.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;

use domino_core::{LifecycleCommand, OperationResult};
use domino_proto::ResultPayload;

use crate::connection::ConnectionId;

/// One in-flight lifecycle command awaiting its terminal result.
#[derive(Debug)]
struct PendingOperation {
    command: LifecycleCommand,
    connection: ConnectionId,
    deadline: Instant,
    tx: oneshot::Sender<OperationResult>,
}

/// Correlation-ID → pending-result registry with timeout enforcement.
#[derive(Debug)]
pub struct OperationRegistry {
    pending: Mutex<HashMap<String, PendingOperation>>,
    timeout: Duration,
}

impl OperationRegistry {
    /// Create a registry applying the given fixed timeout to every operation.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// The configured per-operation timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Register a pending operation and arm its timeout watchdog.
    ///
    /// The returned receiver resolves exactly once: with the reported result,
    /// a failure-derived result, or `TIMEOUT` once the deadline passes.
    pub fn register(
        self: &Arc<Self>,
        correlation_id: &str,
        command: LifecycleCommand,
        connection: ConnectionId,
    ) -> oneshot::Receiver<OperationResult> {
        let (tx, rx) = oneshot::channel();
        let deadline = Instant::now() + self.timeout;

        self.pending.lock().insert(
            correlation_id.to_string(),
            PendingOperation {
                command,
                connection,
                deadline,
                tx,
            },
        );

        let registry = Arc::clone(self);
        let correlation_id = correlation_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            registry.expire(&correlation_id);
        });

        rx
    }

    /// Resolve a pending operation with the result carried by the agent.
    ///
    /// A result for an unknown (already resolved or timed-out) correlation ID
    /// is logged and discarded.
    pub fn resolve_result(&self, correlation_id: &str, payload: ResultPayload) {
        let Some(entry) = self.pending.lock().remove(correlation_id) else {
            tracing::warn!(
                correlation_id,
                status = %payload.status,
                "Discarding result with no pending operation"
            );
            return;
        };

        let result = OperationResult::reported(
            payload.status,
            payload.deploy_operation,
            payload.deployed_version,
        );
        Self::deliver(entry, correlation_id, result);
    }

    /// Resolve a pending operation with a failure-derived result.
    pub fn resolve_failure(&self, correlation_id: &str, message: &str) {
        let Some(entry) = self.pending.lock().remove(correlation_id) else {
            tracing::warn!(
                correlation_id,
                message,
                "Discarding failure with no pending operation"
            );
            return;
        };

        let result = OperationResult::failed(entry.command, message);
        Self::deliver(entry, correlation_id, result);
    }

    /// Fail every pending operation bound to a closed connection.
    ///
    /// A pending operation must not observably outlive its socket.
    pub fn fail_connection(&self, connection: ConnectionId) {
        let drained: Vec<(String, PendingOperation)> = {
            let mut pending = self.pending.lock();
            let ids: Vec<String> = pending
                .iter()
                .filter(|(_, entry)| entry.connection == connection)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| pending.remove(&id).map(|entry| (id, entry)))
                .collect()
        };

        for (correlation_id, entry) in drained {
            let result = OperationResult::failed(entry.command, "agent connection closed");
            Self::deliver(entry, &correlation_id, result);
        }
    }

    /// Drop a pending operation without resolving it.
    ///
    /// Used when the command envelope could not be sent at all; the caller
    /// reports the send error instead of a result.
    pub fn discard(&self, correlation_id: &str) {
        self.pending.lock().remove(correlation_id);
    }

    /// Number of operations currently in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    fn expire(&self, correlation_id: &str) {
        let Some(entry) = self.pending.lock().remove(correlation_id) else {
            return;
        };

        tracing::warn!(
            correlation_id,
            command = %entry.command,
            "Operation timed out"
        );
        let result = OperationResult::timed_out(entry.command);
        Self::deliver(entry, correlation_id, result);
    }

    fn deliver(entry: PendingOperation, correlation_id: &str, result: OperationResult) {
        if entry.tx.send(result).is_err() {
            tracing::debug!(correlation_id, "Operation caller went away before resolution");
        }
    }
}
