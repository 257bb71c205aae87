//! # Block Store Port
//!
//! Query contract over the accepted header chain, plus an in-memory adapter.
//!
//! The store holds a single linear chain. It may begin at any height (a
//! checkpoint), and every later block must extend the tip.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::entities::{Block, Hash};
use crate::errors::StoreError;

/// Read/append access to the accepted header chain.
///
/// Implementations serialize `add_block` internally; all methods take `&self`.
pub trait BlockStore: Send + Sync {
    /// Block at `height`, if stored.
    fn block(&self, height: u32) -> Option<Block>;

    /// Stored blocks with heights in `from..=to`, ordered by height.
    fn blocks(&self, from: u32, to: u32, ascending: bool) -> Vec<Block>;

    /// Timestamps of stored blocks with heights in `from..=to`, oldest first.
    fn timestamps(&self, from: u32, to: u32) -> Vec<u32>;

    /// Current chain tip.
    fn last_block(&self) -> Option<Block>;

    /// Lookup by header hash.
    fn block_by_hash(&self, hash: &Hash) -> Option<Block>;

    /// Append a block that extends the tip.
    fn add_block(&self, block: Block) -> Result<(), StoreError>;

    /// Number of stored blocks.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, hash: &Hash) -> bool {
        self.block_by_hash(hash).is_some()
    }
}

#[derive(Default)]
struct ChainIndex {
    by_height: BTreeMap<u32, Block>,
    by_hash: HashMap<Hash, u32>,
}

/// In-memory [`BlockStore`] for tests and embedding.
#[derive(Default)]
pub struct InMemoryBlockStore {
    inner: RwLock<ChainIndex>,
}

impl InMemoryBlockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a contiguous run of blocks.
    pub fn with_blocks(blocks: impl IntoIterator<Item = Block>) -> Result<Self, StoreError> {
        let store = Self::new();
        for block in blocks {
            store.add_block(block)?;
        }
        Ok(store)
    }
}

impl BlockStore for InMemoryBlockStore {
    fn block(&self, height: u32) -> Option<Block> {
        self.inner.read().by_height.get(&height).cloned()
    }

    fn blocks(&self, from: u32, to: u32, ascending: bool) -> Vec<Block> {
        if from > to {
            return Vec::new();
        }
        let inner = self.inner.read();
        let range = inner.by_height.range(from..=to).map(|(_, b)| b.clone());
        if ascending {
            range.collect()
        } else {
            range.rev().collect()
        }
    }

    fn timestamps(&self, from: u32, to: u32) -> Vec<u32> {
        if from > to {
            return Vec::new();
        }
        self.inner
            .read()
            .by_height
            .range(from..=to)
            .map(|(_, b)| b.timestamp())
            .collect()
    }

    fn last_block(&self) -> Option<Block> {
        self.inner
            .read()
            .by_height
            .last_key_value()
            .map(|(_, b)| b.clone())
    }

    fn block_by_hash(&self, hash: &Hash) -> Option<Block> {
        let inner = self.inner.read();
        inner
            .by_hash
            .get(hash)
            .and_then(|height| inner.by_height.get(height))
            .cloned()
    }

    fn add_block(&self, block: Block) -> Result<(), StoreError> {
        let mut inner = self.inner.write();

        if let Some(height) = inner.by_hash.get(&block.hash()) {
            return Err(StoreError::AlreadyStored { height: *height });
        }

        if let Some((_, tip)) = inner.by_height.last_key_value() {
            let connects = tip.height().checked_add(1) == Some(block.height())
                && tip.hash() == block.prev_hash();
            if !connects {
                return Err(StoreError::NotConnected {
                    height: block.height(),
                    tip_height: tip.height(),
                });
            }
        }

        debug!(height = block.height(), block = %block, "Block stored");
        inner.by_hash.insert(block.hash(), block.height());
        inner.by_height.insert(block.height(), block);
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.read().by_height.len()
    }
}
