//! Replicated-object groups.
//!
//! A group is a named set of replicated objects identified by a compact,
//! versioned 64-bit handle. The table recycles slots with epoch counters and
//! unique ids so stale handles fail safely instead of aliasing a reused slot.

mod handle;
mod table;

pub use handle::{
    GroupIndex, NetObjectGroupHandle, EPOCH_BITS, EPOCH_MASK, GROUP_INDEX_BITS,
    INVALID_GROUP_INDEX, MAX_GROUP_INDEX_COUNT, NET_GROUP_OWNER_GROUP_INDEX,
    NET_GROUP_REPLAY_GROUP_INDEX, NOT_REPLICATED_GROUP_INDEX,
};
pub use table::{FilterStatus, NetObjectGroup, NetObjectGroups};
