//! # Domain Layer
//!
//! Peer state, peer tasks and error types.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::{PeerSyncState, SyncPhase};
pub use errors::{MerkleError, SyncError};
pub use value_objects::{CompletedTask, PeerTask, SyncStatus};
