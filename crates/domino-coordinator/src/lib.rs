//! Domino coordinator.
//!
//! The coordinator is the central process of the fleet: it accepts persistent
//! WebSocket connections from agents, authorizes and identifies them against
//! the statically configured known-agents list, and issues deployment
//! lifecycle commands whose outcomes are correlated through an in-flight
//! operation registry with a bounded wait.
//!
//! Connection and operation state are entirely in-memory; a reconnecting
//! agent re-announces and the registries are rebuilt as messages arrive.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod http;
pub mod operations;
pub mod registry;
pub mod routes;
pub mod service;
pub mod state;
pub mod ws;

pub use config::CoordinatorConfig;
pub use connection::{ConnectionHandle, ConnectionId};
pub use error::{CoordinatorError, Result};
pub use operations::OperationRegistry;
pub use registry::{AgentRegistry, TrackOutcome};
pub use routes::create_router;
pub use service::FleetService;
pub use state::CoordinatorState;
