//! # Chain Window
//!
//! Read-only views over stored ancestors that the difficulty rules need.
//!
//! All lookups are by height on the single stored chain, so a candidate that
//! is not yet stored can still be used as the reference point.

use shared_types::{Block, BlockStore};
use std::sync::Arc;

/// Blocks considered by the median-time-past rule (the block plus 10 ancestors).
pub const MEDIAN_TIME_SPAN: u32 = 11;

/// Cheap-to-clone accessor over a [`BlockStore`].
#[derive(Clone)]
pub struct ChainWindow {
    store: Arc<dyn BlockStore>,
}

impl ChainWindow {
    pub fn new(store: Arc<dyn BlockStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn BlockStore> {
        &self.store
    }

    /// The ancestor `count` heights below `block`.
    pub fn previous(&self, block: &Block, count: u32) -> Option<Block> {
        let height = block.height().checked_sub(count)?;
        self.store.block(height)
    }

    /// The `count` blocks strictly before `block`, oldest first.
    ///
    /// `None` unless all `count` are stored; never a short list.
    pub fn previous_window(&self, block: &Block, count: u32) -> Option<Vec<Block>> {
        if count == 0 {
            return Some(Vec::new());
        }
        let from = block.height().checked_sub(count)?;
        let blocks = self.store.blocks(from, block.height() - 1, true);
        (blocks.len() == count as usize).then_some(blocks)
    }

    /// Median timestamp of `block` and its 10 predecessors.
    ///
    /// Falls back to the block's own timestamp when fewer than 11 blocks
    /// are available.
    pub fn median_time_past(&self, block: &Block) -> i64 {
        let Some(from) = block.height().checked_sub(MEDIAN_TIME_SPAN - 1) else {
            return i64::from(block.timestamp());
        };

        let mut times = self.store.timestamps(from, block.height() - 1);
        if times.len() != (MEDIAN_TIME_SPAN - 1) as usize {
            return i64::from(block.timestamp());
        }
        times.push(block.timestamp());
        times.sort_unstable();
        i64::from(times[times.len() / 2])
    }

    /// Index of the median-by-timestamp block among exactly three.
    ///
    /// Ties keep their original order.
    pub fn suitable_block_index(window: &[Block]) -> Option<usize> {
        let [a, b, c] = window else {
            return None;
        };
        let time = [a.timestamp(), b.timestamp(), c.timestamp()];
        let mut order = [0usize, 1, 2];

        if time[order[0]] > time[order[2]] {
            order.swap(0, 2);
        }
        if time[order[0]] > time[order[1]] {
            order.swap(0, 1);
        }
        if time[order[1]] > time[order[2]] {
            order.swap(1, 2);
        }
        Some(order[1])
    }

    /// Median-by-timestamp of `block` and its two parents.
    pub fn suitable_block(&self, block: &Block) -> Option<Block> {
        let mut window = self.previous_window(block, 2)?;
        window.push(block.clone());
        let index = Self::suitable_block_index(&window)?;
        Some(window.swap_remove(index))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn window_over(blocks: Vec<Block>) -> ChainWindow {
        ChainWindow::new(store_of(blocks))
    }

    #[test]
    fn test_previous() {
        let blocks = regular_chain(0, 10, 600, 0x1d00ffff);
        let tip = blocks[9].clone();
        let window = window_over(blocks);

        assert_eq!(window.previous(&tip, 3).unwrap().height(), 6);
        assert_eq!(window.previous(&tip, 9).unwrap().height(), 0);
        assert!(window.previous(&tip, 10).is_none());
    }

    #[test]
    fn test_previous_window_exact_length() {
        let blocks = regular_chain(100, 10, 600, 0x1d00ffff);
        let tip = blocks[9].clone();
        let window = window_over(blocks);

        let heights: Vec<u32> = window
            .previous_window(&tip, 3)
            .unwrap()
            .iter()
            .map(Block::height)
            .collect();
        assert_eq!(heights, vec![106, 107, 108]);

        // all nine ancestors are stored, the tenth is not
        assert_eq!(window.previous_window(&tip, 9).unwrap().len(), 9);
        assert!(window.previous_window(&tip, 10).is_none());
        assert!(window.previous_window(&tip, 200).is_none());
    }

    #[test]
    fn test_median_time_past_short_chain_uses_own_time() {
        let blocks = regular_chain(0, 7, 600, 0x1d00ffff);
        let tip = blocks[6].clone();
        let window = window_over(blocks);
        assert_eq!(window.median_time_past(&tip), i64::from(tip.timestamp()));
    }

    #[test]
    fn test_median_time_past_unsorted() {
        // timestamps deliberately out of order
        let times = [10, 50, 20, 40, 30, 90, 60, 80, 70, 100, 15];
        let entries: Vec<(u32, u32)> = times.iter().map(|&t| (t, 0x1d00ffff)).collect();
        let blocks = chain_with(0, &entries);
        let tip = blocks[10].clone();
        let window = window_over(blocks);

        // sorted: 10 15 20 30 40 50 60 70 80 90 100 -> median 50
        assert_eq!(window.median_time_past(&tip), 50);
    }

    #[test]
    fn test_suitable_block_index() {
        let make = |times: [u32; 3]| {
            let entries: Vec<(u32, u32)> = times.iter().map(|&t| (t, 0x1d00ffff)).collect();
            chain_with(0, &entries)
        };

        assert_eq!(ChainWindow::suitable_block_index(&make([1, 2, 3])), Some(1));
        assert_eq!(ChainWindow::suitable_block_index(&make([3, 2, 1])), Some(1));
        assert_eq!(ChainWindow::suitable_block_index(&make([2, 3, 1])), Some(0));
        assert_eq!(ChainWindow::suitable_block_index(&make([1, 3, 2])), Some(2));
        assert_eq!(ChainWindow::suitable_block_index(&make([5, 5, 5])), Some(1));
        assert_eq!(ChainWindow::suitable_block_index(&make([1, 2, 3])[..2]), None);
    }

    #[test]
    fn test_suitable_block() {
        let entries = [(100, 1), (300, 1), (200, 1)];
        let blocks = chain_with(0, &entries);
        let tip = blocks[2].clone();
        let window = window_over(blocks);
        assert_eq!(window.suitable_block(&tip).unwrap().timestamp(), 200);
    }
}
