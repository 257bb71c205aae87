//! # Domain Entities
//!
//! Per-peer download state tracked by the orchestrator.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Where a peer stands in the download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    /// Connected, nothing requested yet or rolled back.
    Unsynced,
    /// Headers synced, filtered blocks still pending.
    HeadersSynced,
    /// Nothing left to download from this peer.
    FullySynced,
}

/// Download state of one connected peer, keyed by host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSyncState {
    pub host: String,
    /// The peer answered a locator with no new hashes.
    pub headers_synced: bool,
    /// Every pending filtered block was downloaded from this peer.
    pub filtered_blocks_synced: bool,
    /// Handshake complete; the peer accepts tasks.
    pub ready: bool,
    /// Tasks sent and not yet answered.
    pub outstanding_tasks: usize,
    /// Delivered invalid data; waiting for the disconnect to land.
    pub rejected: bool,
    /// Height the peer announced on connect.
    pub announced_height: u32,
    /// Connection order, lower is earlier.
    pub connected_seq: u64,
    /// Consecutive batches that failed for recoverable reasons.
    pub recoverable_failures: u32,
}

impl PeerSyncState {
    pub fn new(host: impl Into<String>, ready: bool, announced_height: u32, seq: u64) -> Self {
        Self {
            host: host.into(),
            headers_synced: false,
            filtered_blocks_synced: false,
            ready,
            outstanding_tasks: 0,
            rejected: false,
            announced_height,
            connected_seq: seq,
            recoverable_failures: 0,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        match (self.headers_synced, self.filtered_blocks_synced) {
            (true, true) => SyncPhase::FullySynced,
            (true, false) => SyncPhase::HeadersSynced,
            _ => SyncPhase::Unsynced,
        }
    }

    pub fn is_synced(&self) -> bool {
        self.phase() == SyncPhase::FullySynced
    }

    /// Ready and idle: a task may be sent now.
    pub fn is_available(&self) -> bool {
        self.ready && self.outstanding_tasks == 0 && !self.rejected
    }

    /// Eligible to take the download slot.
    pub fn is_candidate(&self) -> bool {
        self.is_available() && !self.is_synced()
    }

    /// Election order: highest announced height, then earliest connection.
    pub fn election_key(&self) -> (u32, Reverse<u64>) {
        (self.announced_height, Reverse(self.connected_seq))
    }

    /// Forget sync progress after the peer announced new blocks.
    pub fn roll_back(&mut self) {
        self.headers_synced = false;
        self.filtered_blocks_synced = false;
    }
}
