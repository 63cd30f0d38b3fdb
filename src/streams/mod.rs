//! Named data streams.
//!
//! A data stream is a named, independently-negotiated sub-channel within a
//! connection's transport. This module holds the streams the connection
//! table wires up (token stream, replication stream), the per-connection
//! export table they share, and the per-connection directory that resolves
//! streams by name. Packet encoding lives with the reader/writer, not here.

mod exports;
mod manager;
mod net_token;
mod replication;

pub use exports::NetExports;
pub use manager::{
    DataStream, DataStreamManager, NET_TOKEN_STREAM_NAME, REPLICATION_STREAM_NAME,
};
pub use net_token::{NetTokenDataStream, NetTokenStreamInit};
pub use replication::ReplicationDataStream;
