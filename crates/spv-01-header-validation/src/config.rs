//! # Network Parameters
//!
//! Per-network consensus constants. Presets exist for Bitcoin and Bitcoin
//! Cash mainnet and testnet; any preset can also be loaded from JSON.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use hex_literal::hex;
use shared_types::{hash_from_display_bytes, Hash};

use crate::domain::{decode_compact, AsertAnchor, Checkpoint, ASERT_HALF_LIFE};

/// Bitcoin Cash block 661648, the first block governed by ASERT.
const BCH_ASERT_FORK_HASH: Hash = hash_from_display_bytes(hex!(
    "0000000000000000029e471c41818d24b8b74c911071c4ef0b4a0509f9b5a8ce"
));

/// Supported networks.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Network {
    BitcoinMainnet,
    BitcoinTestnet,
    BitcoinCashMainnet,
    BitcoinCashTestnet,
    /// Local chains with a trivial proof-of-work limit.
    Regtest,
}

impl Network {
    pub fn params(self) -> NetworkParams {
        match self {
            Self::BitcoinMainnet => NetworkParams::bitcoin_mainnet(),
            Self::BitcoinTestnet => NetworkParams::bitcoin_testnet(),
            Self::BitcoinCashMainnet => NetworkParams::bitcoin_cash_mainnet(),
            Self::BitcoinCashTestnet => NetworkParams::bitcoin_cash_testnet(),
            Self::Regtest => NetworkParams::for_testing(),
        }
    }
}

/// Consensus constants for one network.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkParams {
    pub network: Network,

    /// Compact encoding of the easiest allowed target.
    pub max_target_bits: u32,

    /// Intended seconds between blocks.
    pub target_spacing: u32,

    /// Seconds one retarget period should take.
    pub target_timespan: u32,

    /// First height of the emergency difficulty adjustment.
    pub eda_activation_height: Option<u32>,

    /// First height of the 144-block difficulty adjustment.
    pub daa_activation_height: Option<u32>,

    /// ASERT anchor; the rule governs every block after it.
    pub asert_anchor: Option<AsertAnchor>,

    /// ASERT half-life in seconds.
    pub asert_half_life: i64,

    /// Header hash pinned at a fork height.
    pub fork_checkpoint: Option<Checkpoint>,

    /// A block more than two spacings after its parent may use the maximum
    /// target (applies to DAA and ASERT).
    pub allow_min_difficulty_blocks: bool,

    /// Between retargets, apply the legacy test-network walk-back rule
    /// instead of carrying bits over.
    pub legacy_testnet_rule: bool,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::bitcoin_mainnet()
    }
}

impl NetworkParams {
    pub fn bitcoin_mainnet() -> Self {
        Self {
            network: Network::BitcoinMainnet,
            max_target_bits: 0x1d00ffff,
            target_spacing: 600,
            target_timespan: 14 * 24 * 60 * 60,
            eda_activation_height: None,
            daa_activation_height: None,
            asert_anchor: None,
            asert_half_life: ASERT_HALF_LIFE,
            fork_checkpoint: None,
            allow_min_difficulty_blocks: false,
            legacy_testnet_rule: false,
        }
    }

    pub fn bitcoin_testnet() -> Self {
        Self {
            network: Network::BitcoinTestnet,
            allow_min_difficulty_blocks: true,
            legacy_testnet_rule: true,
            ..Self::bitcoin_mainnet()
        }
    }

    pub fn bitcoin_cash_mainnet() -> Self {
        Self {
            network: Network::BitcoinCashMainnet,
            eda_activation_height: Some(478_559),
            daa_activation_height: Some(504_032),
            asert_anchor: Some(AsertAnchor {
                height: 661_647,
                bits: 0x1804dafe,
                parent_time: 1_605_447_844,
            }),
            fork_checkpoint: Some(Checkpoint::new(661_648, BCH_ASERT_FORK_HASH)),
            ..Self::bitcoin_mainnet()
        }
    }

    pub fn bitcoin_cash_testnet() -> Self {
        Self {
            network: Network::BitcoinCashTestnet,
            eda_activation_height: Some(1_155_876),
            daa_activation_height: Some(1_188_698),
            asert_anchor: Some(AsertAnchor {
                height: 1_421_481,
                bits: 0x1d00ffff,
                parent_time: 1_605_445_400,
            }),
            allow_min_difficulty_blocks: true,
            ..Self::bitcoin_mainnet()
        }
    }

    /// Regtest-style parameters: trivial proof of work and a 10-block
    /// retarget period.
    pub fn for_testing() -> Self {
        Self {
            network: Network::Regtest,
            max_target_bits: 0x207fffff,
            target_spacing: 600,
            target_timespan: 6_000,
            ..Self::bitcoin_mainnet()
        }
    }

    /// Load parameters from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Blocks per legacy retarget period.
    pub fn height_interval(&self) -> u32 {
        (self.target_timespan / self.target_spacing.max(1)).max(1)
    }

    /// Easiest allowed target.
    pub fn max_target(&self) -> U256 {
        decode_compact(self.max_target_bits)
    }
}
