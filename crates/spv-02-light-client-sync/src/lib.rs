//! # Light Client Sync (SPV)
//!
//! Initial block download for a light client: block hashes and filtered
//! blocks are fetched from one elected peer at a time, headers pass the
//! network's validation pipeline and filtered blocks their partial merkle
//! proof before anything reaches storage.
//!
//! ## Module Structure
//!
//! ```text
//! spv-02-light-client-sync/
//! ├── domain/          # Peer sync state, peer tasks, errors
//! ├── algorithms/      # Partial merkle trees, block locators
//! ├── ports/           # Sync commands (inbound), SyncPeer (outbound)
//! ├── application/     # BlockSyncer, InitialBlockDownload, SyncService
//! └── config.rs        # SyncConfig
//! ```
//!
//! ## Example
//!
//! ```rust
//! use spv_02_light_client_sync::{build_partial_tree, extract_matches};
//!
//! let txids = [[1u8; 32], [2u8; 32], [3u8; 32]];
//! let tree = build_partial_tree(&txids, &[false, true, false]);
//! let result = extract_matches(&tree).unwrap();
//! assert_eq!(result.matched, vec![[2u8; 32]]);
//! ```

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use algorithms::{
    block_locator, build_partial_tree, compute_merkle_root, extract_matches,
    verify_filtered_block, MerkleMatch,
};
pub use application::{BlockSyncer, InitialBlockDownload, SyncHandle, SyncService};
pub use config::SyncConfig;
pub use domain::{
    CompletedTask, MerkleError, PeerSyncState, PeerTask, SyncError, SyncPhase, SyncStatus,
};
pub use ports::{MockPeer, SyncCommand, SyncPeer};
