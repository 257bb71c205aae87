//! # Algorithms
//!
//! Partial merkle proofs and block locators.

pub mod locator;
pub mod partial_merkle;

pub use locator::{block_locator, DENSE_LOCATOR_ENTRIES};
pub use partial_merkle::{
    build_partial_tree, compute_merkle_root, extract_matches, verify_filtered_block, MerkleMatch,
};
