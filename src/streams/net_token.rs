//! Net Token Data Stream
//!
//! The sub-channel that carries tokenized values (names, string tables) for a
//! connection. The replication stream depends on it: replication data cannot
//! be tokenized without a token stream on the same connection.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::streams::exports::NetExports;

/// Parameters wired into the token stream when a connection's transport
/// becomes ready.
#[derive(Debug, Clone)]
pub struct NetTokenStreamInit {
    pub connection_id: u32,
    pub replication_system_id: u32,
    pub net_exports: Arc<NetExports>,
}

/// Named "NetToken" stream for one connection.
#[derive(Debug, Default)]
pub struct NetTokenDataStream {
    state: Mutex<Option<NetTokenStreamInit>>,
}

impl NetTokenDataStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the stream to a connection. A second call overwrites the
    /// previous wiring; the session layer calls this once per
    /// transport-ready transition.
    pub fn init(&self, params: NetTokenStreamInit) {
        tracing::debug!(
            connection_id = params.connection_id,
            replication_system_id = params.replication_system_id,
            "net token stream initialized"
        );
        *self.state.lock() = Some(params);
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().is_some()
    }

    /// Connection the stream is wired to, if initialized.
    pub fn connection_id(&self) -> Option<u32> {
        self.state.lock().as_ref().map(|params| params.connection_id)
    }

    /// Export table the stream flushes from, if initialized.
    pub fn net_exports(&self) -> Option<Arc<NetExports>> {
        self.state
            .lock()
            .as_ref()
            .map(|params| params.net_exports.clone())
    }
}
