//! Coordinator application state.
//!
//! All shared components are constructed once at the process entry point and
//! injected here; there are no ambient singletons.

use std::sync::Arc;

use domino_proto::MessageDispatcher;

use crate::config::CoordinatorConfig;
use crate::handlers::{build_dispatcher, ConnectionContext};
use crate::operations::OperationRegistry;
use crate::registry::AgentRegistry;
use crate::service::FleetService;

/// Shared state for all request handlers and connections.
pub struct CoordinatorState {
    /// Coordinator configuration.
    pub config: CoordinatorConfig,
    /// The agent identity/connection registry.
    pub registry: Arc<AgentRegistry>,
    /// The in-flight operation registry.
    pub operations: Arc<OperationRegistry>,
    /// The caller-facing command service.
    pub fleet: FleetService,
    /// The inbound message dispatcher shared by all connections.
    pub dispatcher: MessageDispatcher<ConnectionContext>,
}

impl CoordinatorState {
    /// Construct the full coordinator component graph from configuration.
    #[must_use]
    pub fn new(config: CoordinatorConfig) -> Self {
        let registry = Arc::new(AgentRegistry::new(config.known_agents.clone()));
        let operations = Arc::new(OperationRegistry::new(config.operation_timeout()));
        let fleet = FleetService::new(Arc::clone(&registry), Arc::clone(&operations));
        let dispatcher = build_dispatcher(Arc::clone(&registry), Arc::clone(&operations));

        Self {
            config,
            registry,
            operations,
            fleet,
            dispatcher,
        }
    }
}
