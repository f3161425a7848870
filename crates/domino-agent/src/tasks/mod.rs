//! Startup pipeline tasks.
//!
//! Run in order: build handshake headers, open the coordinator connection,
//! announce the agent's identity, then schedule the keep-alive loop.

mod announce;
mod connect;
mod headers;
mod keepalive;

pub use announce::AnnounceTask;
pub use connect::ConnectTask;
pub use headers::HeaderTask;
pub use keepalive::KeepAliveTask;
