//! Data Stream Manager
//!
//! Per-connection directory of named data streams. The session layer
//! registers the streams a connection's transport negotiated; the connection
//! table resolves them by their well-known names during stream bring-up.

use std::collections::HashMap;
use std::sync::Arc;

use crate::streams::exports::NetExports;
use crate::streams::net_token::NetTokenDataStream;
use crate::streams::replication::ReplicationDataStream;

/// Well-known name of the token stream.
pub const NET_TOKEN_STREAM_NAME: &str = "NetToken";
/// Well-known name of the replication stream.
pub const REPLICATION_STREAM_NAME: &str = "Replication";

/// A registered data stream. Streams are resolved by name; the variant takes
/// the place of a downcast.
#[derive(Debug, Clone)]
pub enum DataStream {
    NetToken(Arc<NetTokenDataStream>),
    Replication(Arc<ReplicationDataStream>),
}

/// Named stream directory for one connection, plus the connection's shared
/// export table.
#[derive(Debug, Default)]
pub struct DataStreamManager {
    streams: HashMap<String, DataStream>,
    net_exports: Arc<NetExports>,
}

impl DataStreamManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the token stream under its well-known name.
    pub fn register_net_token_stream(&mut self, stream: Arc<NetTokenDataStream>) {
        self.streams
            .insert(NET_TOKEN_STREAM_NAME.to_string(), DataStream::NetToken(stream));
    }

    /// Register the replication stream under its well-known name.
    pub fn register_replication_stream(&mut self, stream: Arc<ReplicationDataStream>) {
        self.streams.insert(
            REPLICATION_STREAM_NAME.to_string(),
            DataStream::Replication(stream),
        );
    }

    /// Look up a stream by name. `None` when the connection kind did not
    /// negotiate that stream; not all connection kinds require replication.
    pub fn get_stream(&self, name: &str) -> Option<&DataStream> {
        self.streams.get(name)
    }

    /// The token stream, if registered.
    pub fn net_token_stream(&self) -> Option<Arc<NetTokenDataStream>> {
        match self.get_stream(NET_TOKEN_STREAM_NAME) {
            Some(DataStream::NetToken(stream)) => Some(stream.clone()),
            _ => None,
        }
    }

    /// The replication stream, if registered.
    pub fn replication_stream(&self) -> Option<Arc<ReplicationDataStream>> {
        match self.get_stream(REPLICATION_STREAM_NAME) {
            Some(DataStream::Replication(stream)) => Some(stream.clone()),
            _ => None,
        }
    }

    /// The connection's export table.
    pub fn net_exports(&self) -> Arc<NetExports> {
        self.net_exports.clone()
    }
}
