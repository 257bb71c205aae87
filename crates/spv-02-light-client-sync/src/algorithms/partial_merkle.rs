//! # Partial Merkle Trees
//!
//! Verification of the `merkleblock` witness: a depth-first list of flag bits
//! and hashes from which the merkle root and the matched transaction hashes
//! are rebuilt.
//!
//! ## Traversal
//!
//! Starting at the root (height `ceil(log2(n))`, position 0), each visited
//! node consumes one flag bit:
//!
//! - height 0, or bit clear: consume one hash. A set bit at height 0 marks a
//!   matched transaction.
//! - otherwise: descend left, then right if the right child exists (else the
//!   left hash is duplicated), and hash the pair.
//!
//! Flag bits are read least significant bit first within each byte.

use shared_types::{merkle_parent, FilteredBlock, Hash, PartialMerkleTree};

use crate::domain::MerkleError;

/// Result of a successful traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleMatch {
    /// Root recomputed from the witness.
    pub root: Hash,
    /// Matched transaction hashes, in block order.
    pub matched: Vec<Hash>,
}

/// Number of nodes at `height` for a tree with `leaves` leaves.
fn tree_width(leaves: u32, height: u32) -> u64 {
    (u64::from(leaves) + (1u64 << height) - 1) >> height
}

fn tree_height(leaves: u32) -> u32 {
    let mut height = 0;
    while tree_width(leaves, height) > 1 {
        height += 1;
    }
    height
}

struct Extractor<'a> {
    tree: &'a PartialMerkleTree,
    bits_used: usize,
    hashes_used: usize,
    matched: Vec<Hash>,
}

impl<'a> Extractor<'a> {
    fn next_bit(&mut self) -> Result<bool, MerkleError> {
        let byte = self
            .tree
            .flags
            .get(self.bits_used / 8)
            .ok_or(MerkleError::NotEnoughBits)?;
        let bit = (byte >> (self.bits_used % 8)) & 1 == 1;
        self.bits_used += 1;
        Ok(bit)
    }

    fn next_hash(&mut self) -> Result<Hash, MerkleError> {
        let hash = *self
            .tree
            .hashes
            .get(self.hashes_used)
            .ok_or(MerkleError::NotEnoughHashes)?;
        self.hashes_used += 1;
        Ok(hash)
    }

    fn traverse(&mut self, height: u32, pos: u64) -> Result<Hash, MerkleError> {
        let parent_of_match = self.next_bit()?;
        if height == 0 || !parent_of_match {
            let hash = self.next_hash()?;
            if height == 0 && parent_of_match {
                self.matched.push(hash);
            }
            return Ok(hash);
        }

        let left = self.traverse(height - 1, pos * 2)?;
        let right = if pos * 2 + 1 < tree_width(self.tree.total_transactions, height - 1) {
            let right = self.traverse(height - 1, pos * 2 + 1)?;
            if right == left {
                return Err(MerkleError::DuplicateBranch);
            }
            right
        } else {
            left
        };
        Ok(merkle_parent(&left, &right))
    }
}

/// Rebuild the root and matched hashes from a partial merkle tree.
///
/// Every supplied hash must be consumed, and every flag byte must hold at
/// least one consumed bit.
pub fn extract_matches(tree: &PartialMerkleTree) -> Result<MerkleMatch, MerkleError> {
    if tree.total_transactions == 0 {
        return Err(MerkleError::NoTransactions);
    }
    if tree.hashes.len() > tree.total_transactions as usize {
        return Err(MerkleError::TooManyHashes {
            hashes: tree.hashes.len(),
            transactions: tree.total_transactions,
        });
    }
    if tree.flags.len() * 8 < tree.hashes.len() {
        return Err(MerkleError::NotEnoughBits);
    }

    let mut extractor = Extractor {
        tree,
        bits_used: 0,
        hashes_used: 0,
        matched: Vec::new(),
    };
    let root = extractor.traverse(tree_height(tree.total_transactions), 0)?;

    if (extractor.bits_used + 7) / 8 != tree.flags.len() {
        return Err(MerkleError::UnnecessaryBits {
            used: extractor.bits_used,
            supplied: tree.flags.len(),
        });
    }
    if extractor.hashes_used != tree.hashes.len() {
        return Err(MerkleError::UnnecessaryHashes {
            used: extractor.hashes_used,
            supplied: tree.hashes.len(),
        });
    }

    Ok(MerkleMatch {
        root,
        matched: extractor.matched,
    })
}

/// Check a filtered block's proof against its header and its transactions
/// against the proof. Returns the matched hashes.
pub fn verify_filtered_block(block: &FilteredBlock) -> Result<Vec<Hash>, MerkleError> {
    let MerkleMatch { root, matched } = extract_matches(&block.tree)?;
    if root != block.header.merkle_root {
        return Err(MerkleError::MerkleRootMismatch {
            expected: block.header.merkle_root,
            actual: root,
        });
    }
    if let Some(tx) = block
        .transactions
        .iter()
        .find(|tx| !matched.contains(&tx.hash))
    {
        return Err(MerkleError::UnmatchedTransaction(tx.hash));
    }
    Ok(matched)
}

/// Merkle root over `txids`, duplicating the last node of odd levels.
///
/// Returns the zero hash for an empty list.
pub fn compute_merkle_root(txids: &[Hash]) -> Hash {
    match u32::try_from(txids.len()) {
        Ok(0) | Err(_) => [0u8; 32],
        Ok(leaves) => subtree_hash(txids, leaves, tree_height(leaves), 0),
    }
}

fn subtree_hash(txids: &[Hash], leaves: u32, height: u32, pos: u64) -> Hash {
    if height == 0 {
        return txids[pos as usize];
    }
    let left = subtree_hash(txids, leaves, height - 1, pos * 2);
    let right = if pos * 2 + 1 < tree_width(leaves, height - 1) {
        subtree_hash(txids, leaves, height - 1, pos * 2 + 1)
    } else {
        left
    };
    merkle_parent(&left, &right)
}

/// Build the partial merkle tree proving `matches` (by index) within `txids`.
///
/// Indices past the end of `matches` count as unmatched. This is the serving
/// side of [`extract_matches`].
pub fn build_partial_tree(txids: &[Hash], matches: &[bool]) -> PartialMerkleTree {
    let leaves = match u32::try_from(txids.len()) {
        Ok(0) | Err(_) => return PartialMerkleTree::default(),
        Ok(leaves) => leaves,
    };

    let mut builder = Builder {
        txids,
        matches,
        leaves,
        bits: Vec::new(),
        hashes: Vec::new(),
    };
    builder.build(tree_height(leaves), 0);

    let mut flags = vec![0u8; (builder.bits.len() + 7) / 8];
    for (i, bit) in builder.bits.iter().enumerate() {
        if *bit {
            flags[i / 8] |= 1 << (i % 8);
        }
    }

    PartialMerkleTree {
        total_transactions: leaves,
        hashes: builder.hashes,
        flags,
    }
}

struct Builder<'a> {
    txids: &'a [Hash],
    matches: &'a [bool],
    leaves: u32,
    bits: Vec<bool>,
    hashes: Vec<Hash>,
}

impl Builder<'_> {
    fn build(&mut self, height: u32, pos: u64) {
        let start = (pos << height) as usize;
        let end = (((pos + 1) << height) as usize).min(self.txids.len());
        let parent_of_match = (start..end).any(|i| self.matches.get(i).copied().unwrap_or(false));
        self.bits.push(parent_of_match);

        if height == 0 || !parent_of_match {
            self.hashes
                .push(subtree_hash(self.txids, self.leaves, height, pos));
            return;
        }
        self.build(height - 1, pos * 2);
        if pos * 2 + 1 < tree_width(self.leaves, height - 1) {
            self.build(height - 1, pos * 2 + 1);
        }
    }
}
