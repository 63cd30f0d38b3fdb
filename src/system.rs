//! Replication System
//!
//! Facade owning the connection table and the group table for one
//! replication system instance. Construction is explicit and
//! config-validated; there is no process-wide registration.

use crate::config::{ConfigError, ReplicationSystemConfig};
use crate::connections::ReplicationConnections;
use crate::groups::NetObjectGroups;

/// One replication system: its connection table and group table.
#[derive(Debug)]
pub struct ReplicationSystem {
    config: ReplicationSystemConfig,
    connections: ReplicationConnections,
    groups: NetObjectGroups,
}

impl ReplicationSystem {
    /// Create a system from a validated configuration.
    pub fn new(config: ReplicationSystemConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        tracing::info!(
            replication_system_id = config.replication_system_id,
            max_connection_count = config.max_connection_count,
            max_group_count = config.max_group_count,
            "replication system created"
        );

        Ok(Self {
            connections: ReplicationConnections::new(config.max_connection_count),
            groups: NetObjectGroups::new(config.max_group_count),
            config,
        })
    }

    /// Identifier of this system, forwarded into data-stream bring-up.
    pub fn id(&self) -> u32 {
        self.config.replication_system_id
    }

    pub fn connections(&self) -> &ReplicationConnections {
        &self.connections
    }

    pub fn connections_mut(&mut self) -> &mut ReplicationConnections {
        &mut self.connections
    }

    pub fn groups(&self) -> &NetObjectGroups {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut NetObjectGroups {
        &mut self.groups
    }

    /// Remove all live connections. Part of shutdown; group handles held by
    /// callers simply go stale.
    pub fn deinit(&mut self) {
        self.connections.deinit();
    }
}
