//! # Domain Errors
//!
//! Error types for light-client sync.

use shared_types::{hash_to_display_hex, Hash, StoreError};
use spv_01_header_validation::ValidationError;
use thiserror::Error;

/// A partial merkle tree that does not describe a valid proof.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// The traversal needed more flag bits than were supplied.
    #[error("Partial merkle tree ran out of flag bits")]
    NotEnoughBits,

    /// The traversal needed more hashes than were supplied.
    #[error("Partial merkle tree ran out of hashes")]
    NotEnoughHashes,

    /// Whole flag bytes were left unread.
    #[error("Partial merkle tree has unused flag bytes: used {used} bits of {supplied} bytes")]
    UnnecessaryBits { used: usize, supplied: usize },

    /// Hashes were left unread.
    #[error("Partial merkle tree has unused hashes: used {used} of {supplied}")]
    UnnecessaryHashes { used: usize, supplied: usize },

    #[error("Partial merkle tree declares no transactions")]
    NoTransactions,

    #[error("Partial merkle tree has {hashes} hashes for {transactions} transactions")]
    TooManyHashes { hashes: usize, transactions: u32 },

    /// Two identical sibling subtrees (CVE-2012-2459 malleability).
    #[error("Partial merkle tree has identical sibling branches")]
    DuplicateBranch,

    #[error(
        "Merkle root mismatch: header {}, proof {}",
        hash_to_display_hex(.expected),
        hash_to_display_hex(.actual)
    )]
    MerkleRootMismatch { expected: Hash, actual: Hash },

    /// A delivered transaction the proof does not match.
    #[error("Transaction {} is not matched by the proof", hash_to_display_hex(.0))]
    UnmatchedTransaction(Hash),
}

/// Errors raised while synchronizing with peers.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Header validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Merkle proof rejected: {0}")]
    Merkle(#[from] MerkleError),

    #[error("Storage failed: {0}")]
    Store(#[from] StoreError),

    #[error("Unknown peer: {0}")]
    UnknownPeer(String),

    /// The sync actor is no longer running.
    #[error("Sync service channel closed")]
    ChannelClosed,
}

impl SyncError {
    /// The peer that supplied the data broke the rules and must be dropped.
    pub fn is_consensus_violation(&self) -> bool {
        match self {
            Self::Validation(e) => e.is_consensus_violation(),
            Self::Merkle(_) => true,
            _ => false,
        }
    }

    /// Retrying from a fresh locator may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Validation(e) => e.is_recoverable(),
            Self::Store(StoreError::NotConnected { .. }) => true,
            _ => false,
        }
    }
}
