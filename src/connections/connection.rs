//! Replication Connection
//!
//! One connection's replication bundle: its reader and writer (owned), a
//! non-owning reference to its replication data stream, and the closing
//! flag. The default value is the empty slot a connection id maps to before
//! registration and after removal.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::connections::reader::ReplicationReader;
use crate::connections::writer::ReplicationWriter;
use crate::streams::ReplicationDataStream;

/// Per-connection replication state. Owned and mutated only by
/// [`ReplicationConnections`](crate::connections::ReplicationConnections).
#[derive(Debug, Default)]
pub struct ReplicationConnection {
    /// Inbound endpoint. The connection table is the owning side; the data
    /// stream only ever holds a weak reference.
    pub reader: Option<Arc<Mutex<ReplicationReader>>>,
    /// Outbound endpoint, owned like the reader.
    pub writer: Option<Arc<Mutex<ReplicationWriter>>>,
    /// The connection's replication stream. The stream's lifetime belongs to
    /// the data-stream manager, so the slot keeps only a weak reference.
    pub data_stream: Option<Weak<ReplicationDataStream>>,
    /// Set by the session layer when teardown begins. A closing connection
    /// stays valid but is excluded from new replication work.
    pub is_closing: bool,
}

impl ReplicationConnection {
    /// True once the slot has endpoints, i.e. between registration and
    /// removal.
    pub fn is_populated(&self) -> bool {
        self.reader.is_some() && self.writer.is_some()
    }
}
