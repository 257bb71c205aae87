//! Test utilities for building mined header chains.
//!
//! Enable with the `test-utils` feature flag. Chains use the regtest limit
//! (`0x207fffff`), where about every other nonce meets the target.
//!
//! # Example
//!
//! ```ignore
//! use spv_01_header_validation::test_utils::mined_chain;
//!
//! let chain = mined_chain(5, 700);
//! assert_eq!(chain[4].height(), 4);
//! assert_eq!(chain[4].prev_hash(), chain[3].hash());
//! ```

use shared_types::{Block, BlockHeader};

use crate::algorithms::ProofOfWorkValidator;
use crate::domain::decode_compact;

/// Regtest proof-of-work limit.
pub const REGTEST_BITS: u32 = 0x207fffff;

/// Regtest genesis timestamp used by these helpers.
pub const GENESIS_TIME: u32 = 1_600_000_000;

/// Bump the nonce until the block meets its own target.
pub fn mine(block: Block) -> Block {
    let pow = ProofOfWorkValidator::new(decode_compact(block.bits()));
    let mut header = *block.header();
    loop {
        let candidate = Block::new(header, block.height());
        if pow.meets_target(&candidate) {
            return candidate;
        }
        header.nonce = header.nonce.wrapping_add(1);
    }
}

/// A mined regtest genesis block.
pub fn genesis() -> Block {
    mine(Block::new(
        BlockHeader {
            version: 1,
            timestamp: GENESIS_TIME,
            bits: REGTEST_BITS,
            ..BlockHeader::default()
        },
        0,
    ))
}

/// A mined child of `parent`, `spacing` seconds later, with the same bits.
pub fn mine_child(parent: &Block, spacing: u32, merkle_root: [u8; 32]) -> Block {
    mine(Block::new(
        BlockHeader {
            version: 1,
            prev_hash: parent.hash(),
            merkle_root,
            timestamp: parent.timestamp() + spacing,
            bits: parent.bits(),
            nonce: 0,
        },
        parent.height() + 1,
    ))
}

/// `count` mined blocks from genesis.
///
/// With a spacing above the target spacing every retarget stays capped at
/// the limit, so the chain is valid under [`NetworkParams::for_testing`].
///
/// [`NetworkParams::for_testing`]: crate::NetworkParams::for_testing
pub fn mined_chain(count: u32, spacing: u32) -> Vec<Block> {
    extend_chain(vec![genesis()], count.saturating_sub(1), spacing)
}

/// Append `count` mined blocks to `chain`.
pub fn extend_chain(mut chain: Vec<Block>, count: u32, spacing: u32) -> Vec<Block> {
    for _ in 0..count {
        let Some(tip) = chain.last() else {
            chain.push(genesis());
            continue;
        };
        let next = mine_child(tip, spacing, [0u8; 32]);
        chain.push(next);
    }
    chain
}
