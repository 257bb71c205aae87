//! # Core Domain Entities
//!
//! Defines the chain entities an SPV client handles.
//!
//! ## Clusters
//!
//! - **Chain**: `BlockHeader`, `Block`
//! - **Filtered Blocks**: `PartialMerkleTree`, `Transaction`, `FilteredBlock`,
//!   `VerifiedBlock`
//! - **Networking**: `InventoryItem`, `InventoryKind`

use serde::{Deserialize, Serialize};

use crate::hashing::{double_sha256, hash_to_display_hex};

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A 32-byte double-SHA-256 hash in internal byte order.
pub type Hash = [u8; 32];

/// Serialized size of a block header on the wire.
pub const HEADER_SIZE: usize = 80;

/// The 80-byte Bitcoin-family block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Block version.
    pub version: i32,
    /// Hash of the parent header.
    pub prev_hash: Hash,
    /// Merkle root of the block's transactions.
    pub merkle_root: Hash,
    /// Unix timestamp in seconds.
    pub timestamp: u32,
    /// Compact target.
    pub bits: u32,
    /// Proof-of-work nonce.
    pub nonce: u32,
}

impl BlockHeader {
    /// Standard little-endian header serialization.
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(&self.prev_hash);
        out[36..68].copy_from_slice(&self.merkle_root);
        out[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    /// Parse a header from its 80-byte serialization.
    pub fn deserialize(bytes: &[u8; HEADER_SIZE]) -> Self {
        let u32_at = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };
        let mut prev_hash = [0u8; 32];
        prev_hash.copy_from_slice(&bytes[4..36]);
        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(&bytes[36..68]);

        Self {
            version: u32_at(0) as i32,
            prev_hash,
            merkle_root,
            timestamp: u32_at(68),
            bits: u32_at(72),
            nonce: u32_at(76),
        }
    }

    /// Double-SHA-256 of the serialized header.
    pub fn hash(&self) -> Hash {
        double_sha256(&self.serialize())
    }
}

/// A header placed at a height in the accepted chain.
///
/// The hash is derived once at construction and the fields are private, so a
/// `Block` can never disagree with its own header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    header: BlockHeader,
    height: u32,
    hash: Hash,
}

impl Block {
    pub fn new(header: BlockHeader, height: u32) -> Self {
        let hash = header.hash();
        Self {
            header,
            height,
            hash,
        }
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn prev_hash(&self) -> Hash {
        self.header.prev_hash
    }

    pub fn timestamp(&self) -> u32 {
        self.header.timestamp
    }

    pub fn bits(&self) -> u32 {
        self.header.bits
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}", self.height, hash_to_display_hex(&self.hash))
    }
}

// =============================================================================
// CLUSTER B: FILTERED BLOCKS
// =============================================================================

/// Merkle witness carried by a filtered block.
///
/// Flag bits are packed least-significant-bit first within each byte, as they
/// appear on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PartialMerkleTree {
    /// Number of transactions in the full block.
    pub total_transactions: u32,
    /// Node hashes in depth-first order.
    pub hashes: Vec<Hash>,
    /// Packed traversal flags.
    pub flags: Vec<u8>,
}

/// A transaction delivered alongside a filtered block.
///
/// The payload is opaque at this layer; only its hash is checked against the
/// merkle witness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: Hash,
    pub raw: Vec<u8>,
}

impl Transaction {
    /// Build a transaction whose hash is derived from its raw bytes.
    pub fn from_raw(raw: Vec<u8>) -> Self {
        Self {
            hash: double_sha256(&raw),
            raw,
        }
    }
}

/// A header plus the partial merkle tree and matched transactions a peer
/// returned for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredBlock {
    pub header: BlockHeader,
    pub tree: PartialMerkleTree,
    pub transactions: Vec<Transaction>,
}

impl FilteredBlock {
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }
}

/// A filtered block whose header was accepted into the chain and whose
/// transactions were proven against its merkle root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedBlock {
    pub block: Block,
    /// Transaction hashes the witness marked as matched, in tree order.
    pub matched: Vec<Hash>,
    pub transactions: Vec<Transaction>,
}

// =============================================================================
// CLUSTER C: NETWORKING
// =============================================================================

/// Kind of an inventory announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryKind {
    Transaction,
    Block,
    FilteredBlock,
}

/// An inventory announcement received from a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryItem {
    pub kind: InventoryKind,
    pub hash: Hash,
}

impl InventoryItem {
    pub fn block(hash: Hash) -> Self {
        Self {
            kind: InventoryKind::Block,
            hash,
        }
    }

    pub fn transaction(hash: Hash) -> Self {
        Self {
            kind: InventoryKind::Transaction,
            hash,
        }
    }

    /// True for block and filtered-block announcements.
    pub fn is_block(&self) -> bool {
        matches!(self.kind, InventoryKind::Block | InventoryKind::FilteredBlock)
    }
}
