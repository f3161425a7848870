//! Strategy selection by runtime kind.

use std::collections::HashMap;
use std::sync::Arc;

use domino_core::SourceType;

use super::strategy::ExecutionStrategy;
use crate::error::AgentError;

/// Maps each configured runtime kind to its execution strategy.
///
/// Built once at startup; selection failures are configuration errors
/// raised before any runtime work is attempted.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<SourceType, Arc<dyn ExecutionStrategy>>,
}

impl StrategyRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under its own execution type.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Arc<dyn ExecutionStrategy>) -> Self {
        self.strategies.insert(strategy.execution_type(), strategy);
        self
    }

    /// Look up the strategy for a runtime kind.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownExecutionType`] when nothing is
    /// registered for `source_type`.
    pub fn select(&self, source_type: SourceType) -> Result<&dyn ExecutionStrategy, AgentError> {
        self.strategies
            .get(&source_type)
            .map(AsRef::as_ref)
            .ok_or(AgentError::UnknownExecutionType(source_type))
    }
}
