//! # Block Syncer
//!
//! Queue of announced block hashes awaiting their filtered blocks, and the
//! checks each filtered block passes before it reaches storage.

use shared_types::{BlockStore, FilteredBlock, Hash, VerifiedBlock};
use spv_01_header_validation::{HeaderAcceptor, NetworkParams};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::algorithms::{block_locator, verify_filtered_block};
use crate::domain::SyncError;

/// Pending and in-flight filtered-block downloads.
pub struct BlockSyncer {
    acceptor: HeaderAcceptor,
    pending: VecDeque<Hash>,
    in_flight: Vec<Hash>,
    queued: HashSet<Hash>,
}

impl BlockSyncer {
    pub fn new(params: &NetworkParams, store: Arc<dyn BlockStore>) -> Self {
        Self::with_acceptor(HeaderAcceptor::new(params, store))
    }

    pub fn with_acceptor(acceptor: HeaderAcceptor) -> Self {
        Self {
            acceptor,
            pending: VecDeque::new(),
            in_flight: Vec::new(),
            queued: HashSet::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn BlockStore> {
        self.acceptor.store()
    }

    /// Queue hashes we neither store nor already track. Returns how many
    /// were new.
    pub fn add_block_hashes(&mut self, hashes: &[Hash]) -> usize {
        let mut added = 0;
        for hash in hashes {
            if self.queued.contains(hash) || self.store().contains(hash) {
                continue;
            }
            self.queued.insert(*hash);
            self.pending.push_back(*hash);
            added += 1;
        }
        debug!(added, pending = self.pending.len(), "Queued block hashes");
        added
    }

    /// Anything queued or requested and not yet delivered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || !self.in_flight.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len() + self.in_flight.len()
    }

    pub fn in_flight(&self) -> &[Hash] {
        &self.in_flight
    }

    /// Move up to `limit` queued hashes in flight and return them.
    pub fn next_batch(&mut self, limit: usize) -> Vec<Hash> {
        let take = limit.min(self.pending.len());
        let batch: Vec<Hash> = self.pending.drain(..take).collect();
        self.in_flight.extend_from_slice(&batch);
        batch
    }

    /// Put in-flight hashes back at the front of the queue, in order.
    pub fn requeue_in_flight(&mut self) {
        for hash in self.in_flight.drain(..).rev() {
            self.pending.push_front(hash);
        }
    }

    /// Forget in-flight hashes. Returns how many were dropped.
    pub fn drop_in_flight(&mut self) -> usize {
        let dropped = self.in_flight.len();
        for hash in self.in_flight.drain(..) {
            self.queued.remove(&hash);
        }
        dropped
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
        self.in_flight.clear();
        self.queued.clear();
    }

    /// Last hash we know of but have not downloaded.
    pub fn newest_pending(&self) -> Option<Hash> {
        self.pending
            .back()
            .or_else(|| self.in_flight.last())
            .copied()
    }

    /// Locator continuing after everything queued.
    pub fn locator(&self) -> Vec<Hash> {
        block_locator(self.store().as_ref(), self.newest_pending())
    }

    pub fn tip_height(&self) -> Option<u32> {
        self.store().last_block().map(|b| b.height())
    }

    /// Verify the proof, validate and store the header.
    ///
    /// Returns `None` for a block that is already stored.
    pub fn handle_filtered_block(
        &mut self,
        block: &FilteredBlock,
    ) -> Result<Option<VerifiedBlock>, SyncError> {
        let hash = block.hash();
        if self.store().contains(&hash) {
            trace!(hash = ?hash, "Filtered block already stored");
            self.forget(&hash);
            return Ok(None);
        }

        let matched = verify_filtered_block(block)?;
        let stored = self.acceptor.accept(&block.header)?;
        self.forget(&hash);

        Ok(Some(VerifiedBlock {
            block: stored,
            matched,
            transactions: block.transactions.clone(),
        }))
    }

    fn forget(&mut self, hash: &Hash) {
        if self.queued.remove(hash) {
            self.in_flight.retain(|h| h != hash);
            self.pending.retain(|h| h != hash);
        }
    }
}
