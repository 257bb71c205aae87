//! # Domain Errors
//!
//! Error types for header validation.

use shared_types::{hash_to_display_hex, Hash, StoreError};
use thiserror::Error;

/// Header validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An ancestor needed by the rule is not stored.
    #[error("No previous block: {missing}")]
    NoPreviousBlock { missing: String },

    /// Bits differ from what the active difficulty rule expects.
    #[error("Unexpected bits at height {height}: expected {expected:#010x}, got {actual:#010x}")]
    NotEqualBits {
        height: u32,
        expected: u32,
        actual: u32,
    },

    /// Bits differ from the periodic retarget result.
    #[error(
        "Unexpected retarget bits at height {height}: expected {expected:#010x}, got {actual:#010x}"
    )]
    NotDifficultyTransitionEqualBits {
        height: u32,
        expected: u32,
        actual: u32,
    },

    /// Header hash does not meet its own target.
    #[error("Invalid proof of work at height {height}: {}", hash_to_display_hex(.hash))]
    InvalidProofOfWork { height: u32, hash: Hash },

    /// Header at a checkpoint height is not the expected one.
    #[error(
        "Wrong header hash at height {height}: expected {}, got {}",
        hash_to_display_hex(.expected),
        hash_to_display_hex(.actual)
    )]
    WrongHeaderHash {
        height: u32,
        expected: Hash,
        actual: Hash,
    },

    /// Parent is stored but is not the chain tip.
    #[error("Header at height {height} forks from the chain below tip {tip_height}")]
    ForkedHeader { height: u32, tip_height: u32 },

    /// Storage rejected the block.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ValidationError {
    /// Missing ancestor at a height.
    pub fn missing_height(height: u32) -> Self {
        Self::NoPreviousBlock {
            missing: format!("height {height}"),
        }
    }

    /// Missing ancestor below height zero.
    pub fn missing_below(height: u32, count: u32) -> Self {
        Self::NoPreviousBlock {
            missing: format!("{count} blocks below height {height}"),
        }
    }

    /// Parent hash not in storage.
    pub fn missing_parent(parent: &Hash) -> Self {
        Self::NoPreviousBlock {
            missing: format!("parent {}", hash_to_display_hex(parent)),
        }
    }

    /// The peer that supplied this header broke a consensus rule.
    pub fn is_consensus_violation(&self) -> bool {
        matches!(
            self,
            Self::NotEqualBits { .. }
                | Self::NotDifficultyTransitionEqualBits { .. }
                | Self::InvalidProofOfWork { .. }
                | Self::WrongHeaderHash { .. }
        )
    }

    /// Local chain is behind or beside the header; re-requesting can fix it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoPreviousBlock { .. } | Self::ForkedHeader { .. })
    }
}
