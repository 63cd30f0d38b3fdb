//! Replication Writer
//!
//! Produces serialized replication data for one connection. As with the
//! reader, the serialization pipeline lives elsewhere; this type carries the
//! lifecycle contract and the per-connection dirty tracking the scheduler
//! feeds each tick.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::streams::NetExports;

/// Outbound half of a connection's replication endpoint.
#[derive(Debug)]
pub struct ReplicationWriter {
    connection_id: u32,
    net_exports: Option<Arc<NetExports>>,
    dirty_objects: BTreeSet<u32>,
    sent_packet_count: u64,
    active: bool,
}

impl ReplicationWriter {
    pub fn new(connection_id: u32) -> Self {
        Self {
            connection_id,
            net_exports: None,
            dirty_objects: BTreeSet::new(),
            sent_packet_count: 0,
            active: true,
        }
    }

    pub fn connection_id(&self) -> u32 {
        self.connection_id
    }

    /// True until `deinit` runs.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Wire in the connection's shared export table. Called during stream
    /// bring-up; a second call overwrites the previous reference.
    pub fn set_net_exports(&mut self, net_exports: Arc<NetExports>) {
        self.net_exports = Some(net_exports);
    }

    pub fn net_exports(&self) -> Option<&Arc<NetExports>> {
        self.net_exports.as_ref()
    }

    /// Mark an object as needing (re)serialization for this connection.
    pub fn mark_dirty(&mut self, object_index: u32) {
        self.dirty_objects.insert(object_index);
    }

    /// Take the dirty set for this tick's serialization pass, in index order.
    pub fn drain_dirty_objects(&mut self) -> Vec<u32> {
        self.sent_packet_count += 1;
        std::mem::take(&mut self.dirty_objects).into_iter().collect()
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty_objects.len()
    }

    pub fn sent_packet_count(&self) -> u64 {
        self.sent_packet_count
    }

    /// Release all bookkeeping, including the export-table reference. The
    /// owning table calls this after the data stream has been detached and
    /// before the writer is dropped.
    pub fn deinit(&mut self) {
        self.dirty_objects.clear();
        self.net_exports = None;
        self.active = false;
    }
}
