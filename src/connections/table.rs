//! Replication Connections
//!
//! The connection table: an array of connection slots indexed by externally
//! assigned connection ids, a bitset marking which ids are live, and the
//! per-connection replication views. The session layer registers ids and
//! wires data streams; the scheduler asks for the open-connection set once
//! per tick.
//!
//! All mutating operations run on the single replication thread. The table
//! itself has no internal locking; callers on other threads must serialize
//! access themselves.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::bitarray::NetBitArray;
use crate::connections::connection::ReplicationConnection;
use crate::connections::reader::ReplicationReader;
use crate::connections::view::ReplicationView;
use crate::connections::writer::ReplicationWriter;
use crate::streams::{DataStreamManager, NetTokenStreamInit};

/// Table of per-connection replication state.
///
/// Connection ids are assigned and retired by an external session layer and
/// are never reused by this table itself; a removed id's slot is reset to
/// empty so the session layer may legally reuse the id later. The invariant
/// throughout: a connection id's valid bit is set exactly when its slot is
/// populated.
#[derive(Debug)]
pub struct ReplicationConnections {
    connections: Vec<ReplicationConnection>,
    views: Vec<ReplicationView>,
    valid_connections: NetBitArray,
}

impl ReplicationConnections {
    /// Create a table with room for `max_connection_count` connection ids.
    pub fn new(max_connection_count: u32) -> Self {
        Self {
            connections: (0..max_connection_count)
                .map(|_| ReplicationConnection::default())
                .collect(),
            views: vec![ReplicationView::default(); max_connection_count as usize],
            valid_connections: NetBitArray::new(max_connection_count),
        }
    }

    /// Number of addressable connection ids.
    pub fn max_connection_count(&self) -> u32 {
        self.valid_connections.bit_count()
    }

    /// Register a connection id: create its reader and writer and mark the
    /// slot valid.
    ///
    /// Panics if the id is out of range or already registered; id lifecycle
    /// is established exactly once by the session layer, so a double add is
    /// a programming error.
    pub fn add_connection(&mut self, connection_id: u32) {
        assert!(
            !self.valid_connections.is_bit_set(connection_id),
            "connection {} already added",
            connection_id
        );

        let connection = &mut self.connections[connection_id as usize];
        connection.reader = Some(Arc::new(Mutex::new(ReplicationReader::new(connection_id))));
        connection.writer = Some(Arc::new(Mutex::new(ReplicationWriter::new(connection_id))));
        connection.is_closing = false;
        self.valid_connections.set_bit(connection_id);
        tracing::debug!(connection_id, "connection added");
    }

    /// Wire the connection's data streams once its transport streams are
    /// available.
    ///
    /// Registers the id first if the session layer has not done so. Inits
    /// the token stream when one is negotiated, hands the manager's export
    /// table to the writer, and attaches reader and writer to the
    /// replication stream when one is negotiated. A missing stream is a
    /// valid configuration (not every connection kind replicates); a
    /// replication stream without a token stream is a contract violation,
    /// since replication data cannot be tokenized without it. A second call
    /// re-wires (overwrite, not error).
    pub fn init_data_streams(
        &mut self,
        replication_system_id: u32,
        connection_id: u32,
        data_stream_manager: &DataStreamManager,
    ) {
        if !self.valid_connections.is_bit_set(connection_id) {
            self.add_connection(connection_id);
        }

        let net_token_stream = data_stream_manager.net_token_stream();
        if let Some(token_stream) = &net_token_stream {
            token_stream.init(NetTokenStreamInit {
                connection_id,
                replication_system_id,
                net_exports: data_stream_manager.net_exports(),
            });
        }

        let connection = &mut self.connections[connection_id as usize];
        let reader = connection
            .reader
            .clone()
            .expect("valid connection has a reader");
        let writer = connection
            .writer
            .clone()
            .expect("valid connection has a writer");

        writer.lock().set_net_exports(data_stream_manager.net_exports());

        if let Some(replication_stream) = data_stream_manager.replication_stream() {
            assert!(
                net_token_stream.is_some(),
                "a Replication stream requires a NetToken stream"
            );
            replication_stream.attach(&reader, &writer);
            connection.data_stream = Some(Arc::downgrade(&replication_stream));
        }

        tracing::debug!(
            connection_id,
            replication_system_id,
            has_token_stream = net_token_stream.is_some(),
            has_replication_stream = connection.data_stream.is_some(),
            "data streams initialized"
        );
    }

    /// Replace the connection's interest filter. O(1), unconditional; only
    /// the array bounds are checked. View updates are independent of tick
    /// cadence.
    pub fn set_replication_view(&mut self, connection_id: u32, view: ReplicationView) {
        self.views[connection_id as usize] = view;
    }

    /// The connection's current interest filter.
    pub fn get_replication_view(&self, connection_id: u32) -> &ReplicationView {
        &self.views[connection_id as usize]
    }

    /// Flag a connection as closing. It stays valid, keeps its resources,
    /// and leaves the open set, so in-flight teardown drains without racing
    /// new replication work.
    ///
    /// Panics if the id is not currently valid.
    pub fn set_connection_closing(&mut self, connection_id: u32) {
        assert!(
            self.valid_connections.is_bit_set(connection_id),
            "set_connection_closing on invalid connection {}",
            connection_id
        );
        self.connections[connection_id as usize].is_closing = true;
        tracing::debug!(connection_id, "connection marked closing");
    }

    /// Tear down a connection and free its slot.
    ///
    /// Panics if the id is not currently valid. The teardown order is
    /// load-bearing: the view resets first so no reader of views observes a
    /// stale association, the data stream detaches before the endpoints are
    /// freed so it can never call into a half-destroyed connection, and only
    /// then are reader and writer deinitialized and dropped.
    pub fn remove_connection(&mut self, connection_id: u32) {
        assert!(
            self.valid_connections.is_bit_set(connection_id),
            "remove_connection on invalid connection {}",
            connection_id
        );

        self.set_replication_view(connection_id, ReplicationView::default());
        self.destroy_reader_and_writer(connection_id);

        self.connections[connection_id as usize] = ReplicationConnection::default();
        self.valid_connections.clear_bit(connection_id);
        tracing::debug!(connection_id, "connection removed");
    }

    /// The connection slot, or `None` when the id is not valid.
    pub fn get_connection(&self, connection_id: u32) -> Option<&ReplicationConnection> {
        if !self.valid_connections.is_bit_set(connection_id) {
            return None;
        }
        Some(&self.connections[connection_id as usize])
    }

    /// Mutable access to the connection slot, or `None` when the id is not
    /// valid.
    pub fn get_connection_mut(&mut self, connection_id: u32) -> Option<&mut ReplicationConnection> {
        if !self.valid_connections.is_bit_set(connection_id) {
            return None;
        }
        Some(&mut self.connections[connection_id as usize])
    }

    /// True when the id's slot is populated.
    pub fn is_valid_connection(&self, connection_id: u32) -> bool {
        self.valid_connections.is_bit_set(connection_id)
    }

    /// The set of currently valid connection ids.
    pub fn valid_connections(&self) -> &NetBitArray {
        &self.valid_connections
    }

    /// The connections eligible for this tick's replication work: valid and
    /// not closing.
    pub fn get_open_connections(&self) -> NetBitArray {
        let mut open = NetBitArray::new(self.valid_connections.bit_count());
        self.valid_connections.for_each_set_bit(|connection_id| {
            if !self.connections[connection_id as usize].is_closing {
                open.set_bit(connection_id);
            }
        });
        open
    }

    /// Remove every live connection. Safe to call with none live; calling
    /// it twice in a row is a no-op the second time.
    pub fn deinit(&mut self) {
        let live: Vec<u32> = self.valid_connections.iter_set_bits().collect();
        for connection_id in live {
            self.remove_connection(connection_id);
        }
    }

    fn destroy_reader_and_writer(&mut self, connection_id: u32) {
        let connection = &mut self.connections[connection_id as usize];

        // Detach before freeing: the stream holds non-owning references to
        // the endpoints and must not observe them mid-destruction.
        if let Some(stream) = connection.data_stream.take().and_then(|weak| weak.upgrade()) {
            stream.detach();
        }

        if let Some(reader) = connection.reader.take() {
            reader.lock().deinit();
        }
        if let Some(writer) = connection.writer.take() {
            writer.lock().deinit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streams::{NetTokenDataStream, ReplicationDataStream};
    use tracing_test::traced_test;

    fn full_manager() -> DataStreamManager {
        let mut manager = DataStreamManager::new();
        manager.register_net_token_stream(Arc::new(NetTokenDataStream::new()));
        manager.register_replication_stream(Arc::new(ReplicationDataStream::new()));
        manager
    }

    #[test]
    fn test_new_table_has_no_connections() {
        let connections = ReplicationConnections::new(8);
        assert_eq!(connections.max_connection_count(), 8);
        assert!(!connections.valid_connections().is_any_set());
        assert!(!connections.get_open_connections().is_any_set());
        assert!(connections.get_connection(0).is_none());
    }

    #[test]
    fn test_add_connection_populates_slot() {
        let mut connections = ReplicationConnections::new(8);
        connections.add_connection(3);

        assert!(connections.is_valid_connection(3));
        let connection = connections.get_connection(3).unwrap();
        assert!(connection.is_populated());
        assert!(!connection.is_closing);
        assert_eq!(
            connection.reader.as_ref().unwrap().lock().connection_id(),
            3
        );
    }

    #[test]
    #[should_panic(expected = "already added")]
    fn test_double_add_panics() {
        let mut connections = ReplicationConnections::new(8);
        connections.add_connection(3);
        connections.add_connection(3);
    }

    #[test]
    fn test_init_data_streams_establishes_slot() {
        let mut connections = ReplicationConnections::new(8);
        let manager = full_manager();

        connections.init_data_streams(1, 5, &manager);

        assert!(connections.is_valid_connection(5));
        assert!(connections.get_open_connections().is_bit_set(5));

        let token_stream = manager.net_token_stream().unwrap();
        assert_eq!(token_stream.connection_id(), Some(5));

        let replication_stream = manager.replication_stream().unwrap();
        assert!(replication_stream.is_attached());
        assert_eq!(
            replication_stream.reader().unwrap().lock().connection_id(),
            5
        );

        // The writer received the manager's export table.
        let connection = connections.get_connection(5).unwrap();
        let writer = connection.writer.as_ref().unwrap().lock();
        assert!(Arc::ptr_eq(
            writer.net_exports().unwrap(),
            &manager.net_exports()
        ));
    }

    #[test]
    fn test_init_data_streams_without_streams_is_soft() {
        let mut connections = ReplicationConnections::new(8);
        let manager = DataStreamManager::new();

        // Not all connection kinds replicate; no streams registered is fine.
        connections.init_data_streams(1, 2, &manager);

        assert!(connections.is_valid_connection(2));
        let connection = connections.get_connection(2).unwrap();
        assert!(connection.data_stream.is_none());
    }

    #[test]
    fn test_init_data_streams_token_only() {
        let mut connections = ReplicationConnections::new(8);
        let mut manager = DataStreamManager::new();
        manager.register_net_token_stream(Arc::new(NetTokenDataStream::new()));

        connections.init_data_streams(1, 2, &manager);

        assert!(manager.net_token_stream().unwrap().is_initialized());
        assert!(connections.get_connection(2).unwrap().data_stream.is_none());
    }

    #[test]
    #[should_panic(expected = "requires a NetToken stream")]
    fn test_replication_stream_without_token_stream_panics() {
        let mut connections = ReplicationConnections::new(8);
        let mut manager = DataStreamManager::new();
        manager.register_replication_stream(Arc::new(ReplicationDataStream::new()));

        connections.init_data_streams(1, 2, &manager);
    }

    #[test]
    fn test_double_init_rewires() {
        let mut connections = ReplicationConnections::new(8);
        let first = full_manager();
        let second = full_manager();

        connections.init_data_streams(1, 2, &first);
        connections.init_data_streams(1, 2, &second);

        // The second manager's stream now holds the endpoints; the writer
        // points at the second export table.
        assert!(second.replication_stream().unwrap().is_attached());
        let connection = connections.get_connection(2).unwrap();
        let writer = connection.writer.as_ref().unwrap().lock();
        assert!(Arc::ptr_eq(
            writer.net_exports().unwrap(),
            &second.net_exports()
        ));
    }

    #[test]
    fn test_set_and_get_replication_view() {
        let mut connections = ReplicationConnections::new(8);
        let view = ReplicationView::single(crate::connections::ViewTarget {
            pos: [10.0, 0.0, 0.0],
            view_radius: 50.0,
            ..Default::default()
        });

        // View assignment needs no valid slot; it is a plain array write.
        connections.set_replication_view(1, view.clone());
        assert_eq!(connections.get_replication_view(1), &view);
    }

    #[traced_test]
    #[test]
    fn test_remove_connection_resets_everything() {
        let mut connections = ReplicationConnections::new(8);
        let manager = full_manager();
        connections.init_data_streams(1, 2, &manager);
        connections.set_replication_view(2, ReplicationView::single(Default::default()));

        let replication_stream = manager.replication_stream().unwrap();
        assert!(replication_stream.is_attached());

        connections.remove_connection(2);

        assert!(!connections.is_valid_connection(2));
        assert!(connections.get_connection(2).is_none());
        assert!(!connections.get_open_connections().is_bit_set(2));
        // View was reset before teardown; observable through the id's slot.
        assert_eq!(
            connections.get_replication_view(2),
            &ReplicationView::default()
        );
        // Stream was detached before the endpoints were freed.
        assert!(!replication_stream.is_attached());
        assert!(replication_stream.reader().is_none());

        assert!(logs_contain("connection removed"));
    }

    #[test]
    #[should_panic(expected = "remove_connection on invalid connection")]
    fn test_remove_invalid_connection_panics() {
        let mut connections = ReplicationConnections::new(8);
        connections.remove_connection(2);
    }

    #[test]
    fn test_id_reuse_after_remove_is_first_use() {
        let mut connections = ReplicationConnections::new(8);
        let first = full_manager();
        connections.init_data_streams(1, 2, &first);
        connections.remove_connection(2);

        let second = full_manager();
        connections.init_data_streams(1, 2, &second);

        assert!(connections.is_valid_connection(2));
        let connection = connections.get_connection(2).unwrap();
        assert!(connection.is_populated());
        assert!(!connection.is_closing);
        // Fresh endpoints, not the ones torn down with the first use.
        assert!(connection.reader.as_ref().unwrap().lock().is_active());
        assert!(second.replication_stream().unwrap().is_attached());
        assert!(!first.replication_stream().unwrap().is_attached());
    }

    #[test]
    fn test_open_connections_excludes_closing() {
        let mut connections = ReplicationConnections::new(8);
        for connection_id in [1, 2, 3] {
            connections.add_connection(connection_id);
        }

        connections.set_connection_closing(2);

        let open = connections.get_open_connections();
        assert!(open.is_bit_set(1));
        assert!(!open.is_bit_set(2));
        assert!(open.is_bit_set(3));

        // Closing is not removed: the connection is still valid.
        assert!(connections.is_valid_connection(2));

        connections.remove_connection(2);
        assert!(!connections.is_valid_connection(2));
        let open = connections.get_open_connections();
        assert_eq!(open.count_set_bits(), 2);
    }

    #[test]
    #[should_panic(expected = "set_connection_closing on invalid connection")]
    fn test_closing_invalid_connection_panics() {
        let mut connections = ReplicationConnections::new(8);
        connections.set_connection_closing(0);
    }

    #[test]
    fn test_deinit_removes_all_and_is_idempotent() {
        let mut connections = ReplicationConnections::new(8);
        for connection_id in [0, 4, 7] {
            connections.add_connection(connection_id);
        }

        connections.deinit();
        assert!(!connections.valid_connections().is_any_set());

        // Second deinit with zero live connections is a no-op.
        connections.deinit();
        assert!(!connections.valid_connections().is_any_set());
    }

    #[test]
    fn test_get_connection_mut_flags_closing() {
        let mut connections = ReplicationConnections::new(8);
        connections.add_connection(1);

        connections.get_connection_mut(1).unwrap().is_closing = true;
        assert!(!connections.get_open_connections().is_bit_set(1));
        assert!(connections.get_connection_mut(5).is_none());
    }
}
