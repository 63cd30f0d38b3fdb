//! Net Exports
//!
//! Shared per-connection export table. The data-stream manager owns one and
//! hands references to both the token stream and the replication writer so
//! exports recorded while serializing replication data are flushed through
//! the token stream.

use parking_lot::Mutex;

/// Pending exports for one connection, shared between the token stream and
/// the replication writer.
#[derive(Debug, Default)]
pub struct NetExports {
    pending: Mutex<Vec<u64>>,
}

impl NetExports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an export for the next token-stream flush.
    pub fn push_export(&self, token: u64) {
        self.pending.lock().push(token);
    }

    /// Take all queued exports, leaving the table empty.
    pub fn drain_exports(&self) -> Vec<u64> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// True when no exports are queued.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
