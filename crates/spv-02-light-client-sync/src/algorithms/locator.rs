//! # Block Locator
//!
//! Hashes describing our chain to a peer so it can find the fork point and
//! answer with what follows.

use shared_types::{BlockStore, Hash};

/// Heights stepped one by one before the step starts doubling.
pub const DENSE_LOCATOR_ENTRIES: usize = 10;

/// Locator over the stored chain, newest first.
///
/// The newest `DENSE_LOCATOR_ENTRIES` heights are listed individually, then
/// the step doubles. The oldest stored block always closes the list. When
/// `newest_pending` is given it leads the list, so the peer continues after
/// hashes we know about but have not downloaded yet.
pub fn block_locator(store: &dyn BlockStore, newest_pending: Option<Hash>) -> Vec<Hash> {
    let mut locator: Vec<Hash> = newest_pending.into_iter().collect();

    let Some(tip) = store.last_block() else {
        return locator;
    };
    let oldest = (tip.height() + 1).saturating_sub(store.len() as u32);

    let mut height = tip.height();
    let mut step = 1u32;
    let mut listed = 0usize;
    while height > oldest {
        if let Some(block) = store.block(height) {
            locator.push(block.hash());
        }
        listed += 1;
        if listed >= DENSE_LOCATOR_ENTRIES {
            step = step.saturating_mul(2);
        }
        height = height.saturating_sub(step).max(oldest);
    }
    if let Some(block) = store.block(oldest) {
        locator.push(block.hash());
    }
    locator
}
