//! Engine limits and tuning for the item world

use serde::{Deserialize, Serialize};

/// Configuration for the item world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    /// Maximum number of parent hops walked before a tree walk gives up
    pub max_tree_depth: usize,
    /// Maximum number of nodes a single child traversal may visit
    pub max_traversal_nodes: usize,
    /// Capacity used when a template asks for an inventory without a size
    pub default_inventory_capacity: usize,
    /// Keep reported diagnostics in memory (they are always logged)
    pub record_diagnostics: bool,
    /// Most recent diagnostics kept when recording; older ones are dropped
    pub max_recorded_diagnostics: usize,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: 32,
            max_traversal_nodes: 4096,
            default_inventory_capacity: 16,
            record_diagnostics: true,
            max_recorded_diagnostics: 256,
        }
    }
}

impl ItemConfig {
    /// Reject limits that would make every tree walk fail immediately
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tree_depth == 0 {
            return Err(ConfigError::ZeroLimit("max_tree_depth"));
        }
        if self.max_traversal_nodes == 0 {
            return Err(ConfigError::ZeroLimit("max_traversal_nodes"));
        }
        if self.default_inventory_capacity == 0 {
            return Err(ConfigError::ZeroLimit("default_inventory_capacity"));
        }
        Ok(())
    }
}

/// Errors that can occur when validating an [`ItemConfig`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let config = ItemConfig::default();
        assert_eq!(config.max_tree_depth, 32);
        assert_eq!(config.max_recorded_diagnostics, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_depth_rejected() {
        let config = ItemConfig {
            max_tree_depth: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroLimit("max_tree_depth"))
        );
    }
}
