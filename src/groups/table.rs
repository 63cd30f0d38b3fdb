//! Group Table
//!
//! Owns the mapping from group handles to group membership and state.
//! Slots are an arena with a free list; each slot carries an epoch that
//! increments on recycle and a unique id minted from a monotonic counter, so
//! stale handles fail validity checks instead of aliasing a newer group.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::groups::handle::{
    GroupIndex, NetObjectGroupHandle, EPOCH_MASK, MAX_GROUP_INDEX_COUNT,
    NET_GROUP_OWNER_GROUP_INDEX, NET_GROUP_REPLAY_GROUP_INDEX, NOT_REPLICATED_GROUP_INDEX,
};

/// Per-connection filter status for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterStatus {
    /// Objects in the group replicate to the connection.
    Allow,
    /// Objects in the group are withheld from the connection.
    Disallow,
}

/// A live group: its optional name, member objects, and the connections the
/// group is currently disallowed for.
#[derive(Debug, Default)]
pub struct NetObjectGroup {
    name: Option<String>,
    members: HashSet<u32>,
    disallowed_connections: HashSet<u32>,
}

impl NetObjectGroup {
    /// Name of the group, if it was created as a named group.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Object indices currently in the group.
    pub fn members(&self) -> &HashSet<u32> {
        &self.members
    }
}

#[derive(Debug)]
struct GroupEntry {
    epoch: u32,
    unique_id: u32,
    group: Option<NetObjectGroup>,
}

/// Arena of replicated-object groups with generational handles.
///
/// Reserved groups (not-replicated, owner, replay) are allocated at
/// construction, are always valid, and can never be destroyed or recycled.
#[derive(Debug)]
pub struct NetObjectGroups {
    entries: Vec<GroupEntry>,
    free_indices: Vec<GroupIndex>,
    named_groups: HashMap<String, NetObjectGroupHandle>,
    next_unique_id: u32,
    live_count: usize,
    max_group_count: u32,
}

impl NetObjectGroups {
    /// Create a group table with capacity for `max_group_count` live groups,
    /// reserved groups included.
    pub fn new(max_group_count: u32) -> Self {
        let mut groups = Self {
            entries: Vec::new(),
            free_indices: Vec::new(),
            named_groups: HashMap::new(),
            next_unique_id: 1,
            live_count: 0,
            max_group_count,
        };

        // Index 0 is the invalid index; its entry exists but never holds a
        // group and never enters the free list.
        groups.entries.push(GroupEntry {
            epoch: 0,
            unique_id: 0,
            group: None,
        });
        for index in [
            NOT_REPLICATED_GROUP_INDEX,
            NET_GROUP_OWNER_GROUP_INDEX,
            NET_GROUP_REPLAY_GROUP_INDEX,
        ] {
            debug_assert_eq!(index as usize, groups.entries.len());
            let unique_id = groups.mint_unique_id();
            groups.entries.push(GroupEntry {
                epoch: 0,
                unique_id,
                group: Some(NetObjectGroup::default()),
            });
            groups.live_count += 1;
        }

        groups
    }

    /// Handle of the reserved not-replicated group.
    pub fn not_replicated_handle(&self) -> NetObjectGroupHandle {
        self.handle_for_index(NOT_REPLICATED_GROUP_INDEX)
    }

    /// Handle of the reserved owner-filtered group.
    pub fn net_group_owner_handle(&self) -> NetObjectGroupHandle {
        self.handle_for_index(NET_GROUP_OWNER_GROUP_INDEX)
    }

    /// Handle of the reserved replay-filtered group.
    pub fn net_group_replay_handle(&self) -> NetObjectGroupHandle {
        self.handle_for_index(NET_GROUP_REPLAY_GROUP_INDEX)
    }

    /// Allocate a new group and return its handle.
    ///
    /// Recycled slots get their epoch bumped and a fresh unique id, so any
    /// outstanding handle to the previous occupant compares unequal and fails
    /// validity checks. Returns the invalid handle when the table is full.
    pub fn create_group(&mut self) -> NetObjectGroupHandle {
        // A fresh slot would mint index entries.len(); index 0 never
        // allocates, so the index space is full at 2^24 entries even if the
        // configured count says otherwise.
        let index_space_full =
            self.free_indices.is_empty() && self.entries.len() >= MAX_GROUP_INDEX_COUNT as usize;
        if self.live_count >= self.max_group_count as usize || index_space_full {
            tracing::warn!(
                max_group_count = self.max_group_count,
                "group table exhausted"
            );
            return NetObjectGroupHandle::invalid();
        }

        let index = match self.free_indices.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.epoch = (entry.epoch + 1) & EPOCH_MASK;
                entry.unique_id = 0; // minted below
                index
            }
            None => {
                let index = self.entries.len() as GroupIndex;
                self.entries.push(GroupEntry {
                    epoch: 0,
                    unique_id: 0,
                    group: None,
                });
                index
            }
        };

        let unique_id = self.mint_unique_id();
        let entry = &mut self.entries[index as usize];
        entry.unique_id = unique_id;
        entry.group = Some(NetObjectGroup::default());
        self.live_count += 1;

        let handle = NetObjectGroupHandle::from_parts(index, entry.epoch, unique_id);
        tracing::debug!(%handle, "group created");
        handle
    }

    /// Allocate a named group. Returns the invalid handle when the name is
    /// already taken or the table is full.
    pub fn create_named_group(&mut self, name: &str) -> NetObjectGroupHandle {
        if self.named_groups.contains_key(name) {
            tracing::warn!(name, "named group already exists");
            return NetObjectGroupHandle::invalid();
        }

        let handle = self.create_group();
        if handle.is_valid() {
            self.entries[handle.group_index() as usize]
                .group
                .as_mut()
                .expect("freshly created group is live")
                .name = Some(name.to_string());
            self.named_groups.insert(name.to_string(), handle);
        }
        handle
    }

    /// Look up a named group. Returns the invalid handle when absent.
    pub fn find_named_group(&self, name: &str) -> NetObjectGroupHandle {
        self.named_groups
            .get(name)
            .copied()
            .unwrap_or_else(NetObjectGroupHandle::invalid)
    }

    /// Destroy a group and free its slot for recycling.
    ///
    /// Returns `false` without touching anything when the handle is stale,
    /// invalid, or refers to a reserved group. Handles legitimately outlive
    /// their group under latency, so stale destruction is a recoverable no-op
    /// rather than a contract failure.
    pub fn destroy_group(&mut self, handle: NetObjectGroupHandle) -> bool {
        if handle.is_reserved() || !self.is_valid_group(handle) {
            return false;
        }

        let index = handle.group_index();
        let entry = &mut self.entries[index as usize];
        let group = entry.group.take().expect("validated group is live");
        if let Some(name) = group.name {
            self.named_groups.remove(&name);
        }
        self.live_count -= 1;
        self.free_indices.push(index);
        tracing::debug!(%handle, "group destroyed");
        true
    }

    /// True if the handle refers to a currently live group: its index is
    /// allocated and both epoch and unique id match the live record.
    pub fn is_valid_group(&self, handle: NetObjectGroupHandle) -> bool {
        if !handle.is_valid() {
            return false;
        }
        let index = handle.group_index() as usize;
        let Some(entry) = self.entries.get(index) else {
            return false;
        };
        entry.group.is_some()
            && entry.epoch == handle.epoch()
            && entry.unique_id == handle.unique_id()
    }

    /// Add an object to a group. Returns `false` on a stale or invalid
    /// handle, `true` otherwise (including when the object was already a
    /// member).
    pub fn add_to_group(&mut self, handle: NetObjectGroupHandle, object_index: u32) -> bool {
        let Some(group) = self.live_group_mut(handle) else {
            return false;
        };
        group.members.insert(object_index);
        true
    }

    /// Remove an object from a group. Returns `false` on a stale or invalid
    /// handle or when the object was not a member.
    pub fn remove_from_group(&mut self, handle: NetObjectGroupHandle, object_index: u32) -> bool {
        let Some(group) = self.live_group_mut(handle) else {
            return false;
        };
        group.members.remove(&object_index)
    }

    /// True if the object is a member of the group.
    pub fn group_contains(&self, handle: NetObjectGroupHandle, object_index: u32) -> bool {
        self.live_group(handle)
            .is_some_and(|group| group.members.contains(&object_index))
    }

    /// Members of a live group, or `None` on a stale or invalid handle.
    pub fn group_members(&self, handle: NetObjectGroupHandle) -> Option<&HashSet<u32>> {
        self.live_group(handle).map(|group| &group.members)
    }

    /// Set the filter status of a group for one connection. Returns `false`
    /// on a stale or invalid handle.
    pub fn set_group_filter_status(
        &mut self,
        handle: NetObjectGroupHandle,
        connection_id: u32,
        status: FilterStatus,
    ) -> bool {
        let Some(group) = self.live_group_mut(handle) else {
            return false;
        };
        match status {
            FilterStatus::Allow => {
                group.disallowed_connections.remove(&connection_id);
            }
            FilterStatus::Disallow => {
                group.disallowed_connections.insert(connection_id);
            }
        }
        true
    }

    /// Filter status of a group for one connection, or `None` on a stale or
    /// invalid handle. Groups default to `Allow` for every connection.
    pub fn group_filter_status(
        &self,
        handle: NetObjectGroupHandle,
        connection_id: u32,
    ) -> Option<FilterStatus> {
        self.live_group(handle).map(|group| {
            if group.disallowed_connections.contains(&connection_id) {
                FilterStatus::Disallow
            } else {
                FilterStatus::Allow
            }
        })
    }

    /// Number of live groups, reserved groups included.
    pub fn group_count(&self) -> usize {
        self.live_count
    }

    fn handle_for_index(&self, index: GroupIndex) -> NetObjectGroupHandle {
        let entry = &self.entries[index as usize];
        NetObjectGroupHandle::from_parts(index, entry.epoch, entry.unique_id)
    }

    fn live_group(&self, handle: NetObjectGroupHandle) -> Option<&NetObjectGroup> {
        if !self.is_valid_group(handle) {
            return None;
        }
        self.entries[handle.group_index() as usize].group.as_ref()
    }

    fn live_group_mut(&mut self, handle: NetObjectGroupHandle) -> Option<&mut NetObjectGroup> {
        if !self.is_valid_group(handle) {
            return None;
        }
        self.entries[handle.group_index() as usize].group.as_mut()
    }

    // The unique id is the final tiebreaker after an epoch wrap; a u32
    // counter does not repeat within the practical lifetime of a session.
    fn mint_unique_id(&mut self) -> u32 {
        let id = self.next_unique_id;
        self.next_unique_id = self.next_unique_id.wrapping_add(1).max(1);
        id
    }
}
