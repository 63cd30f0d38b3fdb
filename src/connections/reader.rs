//! Replication Reader
//!
//! Consumes serialized replication data arriving on one connection. The
//! deserialization pipeline itself is a separate subsystem; the connection
//! table only manages the reader's lifecycle and the per-connection
//! bookkeeping that survives between packets.

/// Inbound half of a connection's replication endpoint.
#[derive(Debug)]
pub struct ReplicationReader {
    connection_id: u32,
    processed_packet_count: u64,
    pending_acks: Vec<u64>,
    active: bool,
}

impl ReplicationReader {
    pub fn new(connection_id: u32) -> Self {
        Self {
            connection_id,
            processed_packet_count: 0,
            pending_acks: Vec::new(),
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

    /// Record an inbound packet that needs acknowledging.
    pub fn note_packet_received(&mut self, sequence: u64) {
        self.processed_packet_count += 1;
        self.pending_acks.push(sequence);
    }

    /// Take the sequence numbers to acknowledge in the next outgoing packet.
    pub fn drain_pending_acks(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.pending_acks)
    }

    pub fn processed_packet_count(&self) -> u64 {
        self.processed_packet_count
    }

    /// Release all bookkeeping. The owning table calls this after the data
    /// stream has been detached and before the reader is dropped.
    pub fn deinit(&mut self) {
        self.pending_acks.clear();
        self.pending_acks.shrink_to_fit();
        self.active = false;
    }
}
