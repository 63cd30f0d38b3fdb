//! Group Handle
//!
//! Compact, versioned identifier for a named set of replicated objects.
//! A handle packs a 24-bit group index, an 8-bit epoch, and a 32-bit unique
//! id into a single 64-bit value for cheap copy, compare, and hash. The
//! epoch and unique id implement the generational-index pattern: a handle
//! that outlives its group compares unequal to any handle minted for a
//! reused index.

use serde::{Deserialize, Serialize};

/// Width of the group index field.
pub const GROUP_INDEX_BITS: u32 = 24;
/// Width of the epoch field.
pub const EPOCH_BITS: u32 = 8;
/// Mask for the epoch field.
pub const EPOCH_MASK: u32 = (1 << EPOCH_BITS) - 1;
/// Upper bound on group indices (exclusive).
pub const MAX_GROUP_INDEX_COUNT: u32 = 1 << GROUP_INDEX_BITS;

const GROUP_INDEX_MASK: u64 = (MAX_GROUP_INDEX_COUNT as u64) - 1;

/// Index portion of a group handle.
pub type GroupIndex = u32;

/// Reserved index: the invalid group. A handle with this index is the
/// canonical invalid handle.
pub const INVALID_GROUP_INDEX: GroupIndex = 0;
/// Reserved index: objects in this group are filtered out for all connections.
pub const NOT_REPLICATED_GROUP_INDEX: GroupIndex = 1;
/// Reserved index: subobjects in this group replicate only to the owning
/// connection of their root.
pub const NET_GROUP_OWNER_GROUP_INDEX: GroupIndex = 2;
/// Reserved index: subobjects in this group replicate when replay conditions
/// are met.
pub const NET_GROUP_REPLAY_GROUP_INDEX: GroupIndex = 3;

/// Versioned 64-bit identifier for a group of replicated objects.
///
/// Equality and hashing are over the full packed value (index + epoch +
/// unique id), never over the index alone. The default handle is the invalid
/// handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NetObjectGroupHandle(u64);

impl NetObjectGroupHandle {
    /// The canonical invalid handle.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Pack index, epoch, and unique id into a handle.
    ///
    /// `INVALID_GROUP_INDEX` always collapses to the canonical invalid
    /// handle, whatever the other fields say.
    pub(crate) fn from_parts(index: GroupIndex, epoch: u32, unique_id: u32) -> Self {
        if index == INVALID_GROUP_INDEX {
            return Self::default();
        }
        debug_assert!(index < MAX_GROUP_INDEX_COUNT);
        let value = (index as u64 & GROUP_INDEX_MASK)
            | (((epoch & EPOCH_MASK) as u64) << GROUP_INDEX_BITS)
            | ((unique_id as u64) << (GROUP_INDEX_BITS + EPOCH_BITS));
        Self(value)
    }

    /// True if this handle refers to some group. Note this does not mean the
    /// group is still live; ask the group table for that.
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Index of the group slot this handle refers to.
    pub fn group_index(self) -> GroupIndex {
        (self.0 & GROUP_INDEX_MASK) as GroupIndex
    }

    /// Generation of the group slot at mint time.
    pub fn epoch(self) -> u32 {
        ((self.0 >> GROUP_INDEX_BITS) as u32) & EPOCH_MASK
    }

    /// Unique id assigned at mint time; final tiebreaker after epoch wrap.
    pub fn unique_id(self) -> u32 {
        (self.0 >> (GROUP_INDEX_BITS + EPOCH_BITS)) as u32
    }

    /// The full packed 64-bit value.
    pub fn raw_value(self) -> u64 {
        self.0
    }

    /// True if `index` is one of the reserved group indices.
    pub fn is_reserved_index(index: GroupIndex) -> bool {
        (NOT_REPLICATED_GROUP_INDEX..=NET_GROUP_REPLAY_GROUP_INDEX).contains(&index)
    }

    /// True if this handle refers to a reserved group.
    pub fn is_reserved(self) -> bool {
        Self::is_reserved_index(self.group_index())
    }

    /// True if this is the not-replicated group.
    pub fn is_not_replicated(self) -> bool {
        self.group_index() == NOT_REPLICATED_GROUP_INDEX
    }

    /// True if this is the owner-filtered group.
    pub fn is_net_group_owner(self) -> bool {
        self.group_index() == NET_GROUP_OWNER_GROUP_INDEX
    }

    /// True if this is the replay-filtered group.
    pub fn is_net_group_replay(self) -> bool {
        self.group_index() == NET_GROUP_REPLAY_GROUP_INDEX
    }
}

impl std::fmt::Debug for NetObjectGroupHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetObjectGroupHandle")
            .field("index", &self.group_index())
            .field("epoch", &self.epoch())
            .field("unique_id", &self.unique_id())
            .finish()
    }
}

impl std::fmt::Display for NetObjectGroupHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "group({}:{}:{})",
            self.group_index(),
            self.epoch(),
            self.unique_id()
        )
    }
}
