//! netrep
//!
//! Connection-management and group-handle core of a network
//! object-replication system for a multi-client simulation server.
//!
//! ## Architecture
//!
//! - **Groups**: compact, versioned 64-bit handles naming sets of replicated
//!   objects, backed by an arena with generational recycling.
//! - **Streams**: named per-connection sub-channels (token stream,
//!   replication stream) and the export table they share with the writer.
//! - **Connections**: the connection table, with slots keyed by externally
//!   assigned connection ids, a valid bitset, per-connection interest views,
//!   and the open-connection set the scheduler consumes each tick.
//!
//! All table mutation runs on the single replication thread; callers on
//! other threads must serialize access. Property wire formats, the physics
//! simulation, and transport handshakes live in other subsystems.

pub mod bitarray;
pub mod config;
pub mod connections;
pub mod groups;
pub mod streams;
pub mod system;

// Re-export commonly used types
pub use bitarray::NetBitArray;
pub use config::{ConfigError, ReplicationSystemConfig};
pub use connections::{
    ReplicationConnection, ReplicationConnections, ReplicationReader, ReplicationView,
    ReplicationWriter, ViewTarget,
};
pub use groups::{FilterStatus, NetObjectGroupHandle, NetObjectGroups};
pub use streams::{
    DataStream, DataStreamManager, NetExports, NetTokenDataStream, NetTokenStreamInit,
    ReplicationDataStream,
};
pub use system::ReplicationSystem;
