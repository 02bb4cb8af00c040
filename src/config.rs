//! Registry configuration
//!
//! Loaded from a YAML file when one is given, otherwise defaults apply.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of shards in the record store
pub const DEFAULT_SHARD_COUNT: usize = 64;

/// Default capacity of the event broadcast channel
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Configuration for the IP registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RegistryConfig {
    /// Number of independently locked shards
    pub shard_count: usize,
    /// Buffered events per subscriber before it starts lagging
    pub event_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Load and validate a YAML config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: RegistryConfig = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(Error::Configuration(
                "shard-count must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::Configuration(
                "event-capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
