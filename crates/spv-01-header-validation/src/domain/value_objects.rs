//! # Domain Value Objects
//!
//! Immutable consensus constants carried by network parameters.

use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// A header hash pinned at a height.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Checkpoint {
    /// Block height of this checkpoint.
    pub height: u32,
    /// Block hash at this height.
    pub hash: Hash,
}

impl Checkpoint {
    pub fn new(height: u32, hash: Hash) -> Self {
        Self { height, hash }
    }
}

/// Reference block for the ASERT schedule.
///
/// Blocks after `height` are targeted relative to this anchor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AsertAnchor {
    /// Height of the anchor block.
    pub height: u32,
    /// Compact target of the anchor block.
    pub bits: u32,
    /// Timestamp of the anchor block's parent.
    pub parent_time: i64,
}

impl AsertAnchor {
    /// First height governed by ASERT.
    pub fn activation_height(&self) -> u32 {
        self.height.saturating_add(1)
    }
}
