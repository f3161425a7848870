//! Domino agent.
//!
//! The agent runs on every managed host, connects out to the coordinator
//! over a persistent WebSocket, announces its identity, and executes
//! deployment lifecycle commands against its local runtime (a raw process,
//! a service-manager unit, or a container engine).
//!
//! Startup is a fail-fast task pipeline; once the pipeline completes the
//! agent is purely reactive, driven by the read loop and the keep-alive
//! watchdog. Losing the connection or a missed pong is fatal: the process
//! exits and external supervision restarts it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod healthcheck;
pub mod pipeline;
pub mod tasks;

pub use config::AgentConfig;
pub use context::{AgentStatus, CoordinatorLink, LinkState, TaskContext};
pub use error::AgentError;
pub use executor::{ExecutionStrategy, StrategyRegistry};
pub use pipeline::{Task, TaskPipeline, TaskStatus};
