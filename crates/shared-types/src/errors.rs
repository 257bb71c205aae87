//! # Error Types
//!
//! Errors raised by block storage.

use thiserror::Error;

/// Errors that can occur when appending to a [`crate::BlockStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Block does not extend the current tip (wrong height or parent hash).
    #[error("Block at height {height} does not connect to tip at height {tip_height}")]
    NotConnected { height: u32, tip_height: u32 },

    /// A block with the same hash is already stored.
    #[error("Block already stored at height {height}")]
    AlreadyStored { height: u32 },
}
