//! Lifecycle command execution.
//!
//! An [`ExecutionStrategy`] decides what deploy/start/stop/restart mean for
//! one runtime kind; a [`RuntimeAdapter`] carries out the host-level
//! primitives; the [`StrategyRegistry`] selects the strategy for the
//! agent's configured source type.

mod container;
mod host;
mod registry;
mod runtime;
mod shell;
mod strategy;

pub use container::ContainerStrategy;
pub use host::HostStrategy;
pub use registry::StrategyRegistry;
pub use runtime::{RuntimeAdapter, RuntimeError};
pub use shell::{DockerCliAdapter, ProcessAdapter, SystemctlAdapter};
pub use strategy::ExecutionStrategy;
