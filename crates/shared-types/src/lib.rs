//! # Shared Types Crate
//!
//! Block-chain entities and the storage port shared by every SPV crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: headers, blocks and filtered-block payloads
//!   are defined once here and consumed by both validation and sync.
//! - **Immutable Blocks**: a [`Block`] derives its hash from its header at
//!   construction; neither can change afterwards.
//! - **Storage as a Port**: only the [`BlockStore`] query contract is owned
//!   here. [`InMemoryBlockStore`] is the reference adapter.

pub mod entities;
pub mod errors;
pub mod hashing;
pub mod store;

pub use entities::*;
pub use errors::*;
pub use hashing::{
    double_sha256, hash_from_display_bytes, hash_from_display_hex, hash_to_display_hex,
    merkle_parent,
};
pub use store::{BlockStore, InMemoryBlockStore};
