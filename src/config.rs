//! Replication System Configuration
//!
//! Sizing and identity for one replication system instance.

use serde::{Deserialize, Serialize};

use crate::groups::{MAX_GROUP_INDEX_COUNT, NET_GROUP_REPLAY_GROUP_INDEX};

/// Configuration for a replication system instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationSystemConfig {
    /// Identifier of this replication system, forwarded to data streams
    /// during bring-up. Multiple systems may coexist in one process.
    pub replication_system_id: u32,

    /// Number of addressable connection ids (default: 128).
    pub max_connection_count: u32,

    /// Maximum live groups, reserved groups included (default: 4096).
    pub max_group_count: u32,
}

impl Default for ReplicationSystemConfig {
    fn default() -> Self {
        Self {
            replication_system_id: 0,
            max_connection_count: 128,
            max_group_count: 4096,
        }
    }
}

impl ReplicationSystemConfig {
    /// Create a configuration for the given system id.
    pub fn new(replication_system_id: u32) -> Self {
        Self {
            replication_system_id,
            ..Default::default()
        }
    }

    /// Set the connection-id capacity.
    pub fn max_connection_count(mut self, count: u32) -> Self {
        self.max_connection_count = count;
        self
    }

    /// Set the group capacity.
    pub fn max_group_count(mut self, count: u32) -> Self {
        self.max_group_count = count;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connection_count == 0 {
            return Err(ConfigError::NoConnections);
        }
        if self.max_group_count <= NET_GROUP_REPLAY_GROUP_INDEX {
            return Err(ConfigError::GroupCountTooSmall {
                requested: self.max_group_count,
            });
        }
        // Index 0 is the invalid index, so the 24-bit index space holds
        // 2^24 - 1 groups, not 2^24.
        if self.max_group_count >= MAX_GROUP_INDEX_COUNT {
            return Err(ConfigError::GroupCountTooLarge {
                requested: self.max_group_count,
            });
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("max_connection_count must be at least 1")]
    NoConnections,
    #[error("max_group_count {requested} does not fit the reserved groups")]
    GroupCountTooSmall { requested: u32 },
    #[error("max_group_count {requested} exceeds the group index space (at most 2^24 - 1 groups)")]
    GroupCountTooLarge { requested: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ReplicationSystemConfig::default();
        assert_eq!(config.max_connection_count, 128);
        assert_eq!(config.max_group_count, 4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ReplicationSystemConfig::new(3)
            .max_connection_count(16)
            .max_group_count(64);

        assert_eq!(config.replication_system_id, 3);
        assert_eq!(config.max_connection_count, 16);
        assert_eq!(config.max_group_count, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_no_connections() {
        let config = ReplicationSystemConfig::default().max_connection_count(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoConnections)
        ));
    }

    #[test]
    fn test_validate_group_count_too_small() {
        // Capacity must exceed the reserved index range.
        let config = ReplicationSystemConfig::default().max_group_count(3);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GroupCountTooSmall { requested: 3 })
        ));
    }

    #[test]
    fn test_validate_group_count_too_large() {
        let config = ReplicationSystemConfig::default().max_group_count(MAX_GROUP_INDEX_COUNT + 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GroupCountTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_group_count_index_space_boundary() {
        // Index 0 never allocates, so a full 2^24 does not fit.
        let config = ReplicationSystemConfig::default().max_group_count(MAX_GROUP_INDEX_COUNT);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GroupCountTooLarge { .. })
        ));

        let config = ReplicationSystemConfig::default().max_group_count(MAX_GROUP_INDEX_COUNT - 1);
        assert!(config.validate().is_ok());
    }
}
