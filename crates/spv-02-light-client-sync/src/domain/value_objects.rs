//! # Value Objects
//!
//! Requests the orchestrator hands to peers and the responses that come back.

use serde::{Deserialize, Serialize};
use shared_types::{FilteredBlock, Hash};

/// Work assigned to a peer. The peer answers with a [`CompletedTask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerTask {
    /// Ask for the block hashes following the first locator hash the peer knows.
    GetBlockHashes { locator: Vec<Hash> },
    /// Ask for filtered blocks by hash, in order.
    GetMerkleBlocks { hashes: Vec<Hash> },
}

impl PeerTask {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GetBlockHashes { .. } => "get_block_hashes",
            Self::GetMerkleBlocks { .. } => "get_merkle_blocks",
        }
    }
}

/// A peer's answer to a [`PeerTask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletedTask {
    /// Hashes following the locator. Empty when the peer has nothing newer.
    BlockHashes(Vec<Hash>),
    /// Filtered blocks, possibly fewer than requested.
    MerkleBlocks(Vec<FilteredBlock>),
}

/// Snapshot of the orchestrator, answered to status queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub running: bool,
    pub active_peer: Option<String>,
    pub connected_peers: Vec<String>,
    pub synced_peers: Vec<String>,
    pub pending_blocks: usize,
    pub tip_height: Option<u32>,
}
