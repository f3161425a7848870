//! Core types and utilities for domino.
//!
//! This crate provides the foundational types shared by the coordinator and
//! agent processes:
//!
//! - **Identity**: the agent triple and its derived `domino-agent://` URI
//! - **Lifecycle**: deployment statuses, lifecycle commands, operation results
//! - **Attempt**: the bounded retry counter used by the healthcheck loop
//! - **Page**: pagination arithmetic for list endpoints
//!
//! # Example
//!
//! ```
//! use domino_core::{AgentIdentity, SourceType};
//!
//! let identity = AgentIdentity::new("k1", "h1", SourceType::Docker);
//! assert_eq!(identity.agent_id(), "domino-agent://h1/docker/k1");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attempt;
pub mod identity;
pub mod page;
pub mod status;

pub use attempt::Attempt;
pub use identity::{AgentIdentity, SourceType, SourceTypeParseError};
pub use page::Page;
pub use status::{DeploymentStatus, LifecycleCommand, OperationResult};
