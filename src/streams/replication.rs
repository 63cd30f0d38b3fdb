//! Replication Data Stream
//!
//! The sub-channel that carries replicated object state for a connection.
//! The stream is owned by the data-stream manager; it holds nullable,
//! non-owning references to the connection's reader and writer. The
//! connection table clears those references before it frees the endpoints,
//! so the stream can never call into a half-destroyed connection.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::connections::{ReplicationReader, ReplicationWriter};

#[derive(Debug)]
struct StreamEndpoints {
    reader: Weak<Mutex<ReplicationReader>>,
    writer: Weak<Mutex<ReplicationWriter>>,
}

/// Named "Replication" stream for one connection.
#[derive(Debug, Default)]
pub struct ReplicationDataStream {
    endpoints: Mutex<Option<StreamEndpoints>>,
}

impl ReplicationDataStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the stream at a connection's reader and writer. The stream does
    /// not keep the endpoints alive; ownership stays with the connection
    /// table.
    pub fn attach(
        &self,
        reader: &Arc<Mutex<ReplicationReader>>,
        writer: &Arc<Mutex<ReplicationWriter>>,
    ) {
        *self.endpoints.lock() = Some(StreamEndpoints {
            reader: Arc::downgrade(reader),
            writer: Arc::downgrade(writer),
        });
    }

    /// Drop the reader/writer references. Must happen before the endpoints
    /// are freed.
    pub fn detach(&self) {
        *self.endpoints.lock() = None;
    }

    pub fn is_attached(&self) -> bool {
        self.endpoints.lock().is_some()
    }

    /// The attached reader, if the stream is attached and the reader is
    /// still alive.
    pub fn reader(&self) -> Option<Arc<Mutex<ReplicationReader>>> {
        self.endpoints
            .lock()
            .as_ref()
            .and_then(|endpoints| endpoints.reader.upgrade())
    }

    /// The attached writer, if the stream is attached and the writer is
    /// still alive.
    pub fn writer(&self) -> Option<Arc<Mutex<ReplicationWriter>>> {
        self.endpoints
            .lock()
            .as_ref()
            .and_then(|endpoints| endpoints.writer.upgrade())
    }
}
