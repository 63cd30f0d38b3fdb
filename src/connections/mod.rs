//! Per-connection replication state.
//!
//! A connection bundles a reader, a writer, an interest-filter view, and a
//! reference to its replication data stream. The table owns the slots, keyed
//! by externally assigned connection ids, and computes the open-connection
//! set the scheduler consumes each tick.

mod connection;
mod reader;
mod table;
mod view;
mod writer;

pub use connection::ReplicationConnection;
pub use reader::ReplicationReader;
pub use table::ReplicationConnections;
pub use view::{ReplicationView, ViewTarget};
pub use writer::ReplicationWriter;
