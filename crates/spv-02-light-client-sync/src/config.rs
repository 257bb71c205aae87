//! # Sync Configuration
//!
//! Configuration for the initial block download.

use serde::{Deserialize, Serialize};
use shared_bus::{InMemoryEventBus, DEFAULT_CHANNEL_CAPACITY};
use spv_01_header_validation::{Network, NetworkParams};

/// Light-client sync configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    /// Network whose consensus rules headers are checked against.
    pub network: Network,

    /// Filtered blocks requested per task.
    pub merkle_batch_size: usize,

    /// Events buffered per subscriber.
    pub event_capacity: usize,

    /// Commands buffered before senders wait.
    pub command_capacity: usize,

    /// Sync is reported stopped when fewer peers than this remain.
    pub min_peers: usize,

    /// Consecutive recoverable failures tolerated from one peer.
    pub max_recoverable_failures: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            network: Network::BitcoinCashMainnet,
            merkle_batch_size: 500,
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
            command_capacity: 256,
            min_peers: 1,
            max_recoverable_failures: 3,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing (regtest rules, small batches).
    pub fn for_testing() -> Self {
        Self {
            network: Network::Regtest,
            merkle_batch_size: 4,
            event_capacity: 256,
            command_capacity: 32,
            min_peers: 1,
            max_recoverable_failures: 2,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn params(&self) -> NetworkParams {
        self.network.params()
    }

    /// Event bus sized for this config.
    pub fn event_bus(&self) -> InMemoryEventBus {
        InMemoryEventBus::with_capacity(self.event_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.network, Network::BitcoinCashMainnet);
        assert_eq!(config.merkle_batch_size, 500);
        assert_eq!(config.min_peers, 1);
    }

    #[test]
    fn test_testing_config() {
        let config = SyncConfig::for_testing();
        assert_eq!(config.params(), NetworkParams::for_testing());
        assert_eq!(config.event_bus().capacity(), 256);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::to_string(&SyncConfig::for_testing()).unwrap();
        assert_eq!(SyncConfig::from_json(&json).unwrap(), SyncConfig::for_testing());
        assert!(SyncConfig::from_json("{}").is_err());
    }
}
