//! # cw-144 Difficulty Adjustment
//!
//! Every block is retargeted from the work done over roughly the last 144
//! blocks. Both window endpoints are the median-by-timestamp of three
//! consecutive blocks, which blunts single-timestamp manipulation.
//!
//! ```text
//! heights:  prev-146 prev-145 prev-144  ...  prev-2 prev-1 prev
//!           \____ first = median ___/        \__ last = median __/
//!
//! work     = sum(block_work) over (first, last]
//! timespan = clamp(last.ts - first.ts, 72 * spacing, 288 * spacing)
//! target   = 2^256 / (work * spacing / timespan) - 1
//! ```

use primitive_types::{U256, U512};
use shared_types::Block;

use super::{expect_bits, is_min_difficulty_gap, BlockValidator};
use crate::config::NetworkParams;
use crate::domain::compact::cap_target;
use crate::domain::{block_work, encode_compact, ChainWindow, ValidationError, DAA_WINDOW};

/// Ancestors fetched before the parent: the window plus two for the first median.
const LOOKBACK: u32 = DAA_WINDOW + 2;

#[derive(Clone)]
pub struct DaaValidator {
    window: ChainWindow,
    activation_height: u32,
    target_spacing: u32,
    max_target_bits: u32,
    max_target: U256,
    allow_min_difficulty_blocks: bool,
}

impl DaaValidator {
    pub fn new(window: ChainWindow, params: &NetworkParams) -> Self {
        Self {
            window,
            activation_height: params.daa_activation_height.unwrap_or(0),
            target_spacing: params.target_spacing,
            max_target_bits: params.max_target_bits,
            max_target: params.max_target(),
            allow_min_difficulty_blocks: params.allow_min_difficulty_blocks,
        }
    }

    /// Bits the block after `previous` must carry (ignoring the
    /// minimum-difficulty exception).
    pub fn next_bits(&self, previous: &Block) -> Result<u32, ValidationError> {
        let mut blocks = self
            .window
            .previous_window(previous, LOOKBACK)
            .ok_or_else(|| ValidationError::missing_below(previous.height(), LOOKBACK))?;
        blocks.push(previous.clone());

        let tail = blocks.len() - 3;
        let first = ChainWindow::suitable_block_index(&blocks[..3])
            .ok_or_else(|| ValidationError::missing_below(previous.height(), LOOKBACK))?;
        let last = tail
            + ChainWindow::suitable_block_index(&blocks[tail..])
                .ok_or_else(|| ValidationError::missing_below(previous.height(), 2))?;

        let work = blocks[first + 1..=last]
            .iter()
            .fold(U256::zero(), |acc, block| acc.saturating_add(block_work(block.bits())));

        let spacing = i64::from(self.target_spacing);
        let elapsed = i64::from(blocks[last].timestamp()) - i64::from(blocks[first].timestamp());
        let timespan = elapsed.clamp(72 * spacing, 288 * spacing);

        // projected work per spacing; positive timespan after clamping
        let projected =
            U512::from(work) * U512::from(spacing as u64) / U512::from(timespan as u64);
        if projected.is_zero() {
            return Ok(self.max_target_bits);
        }

        let target = (U512::one() << 256) / projected - U512::one();
        Ok(encode_compact(cap_target(target, self.max_target)))
    }
}

impl BlockValidator for DaaValidator {
    fn is_applicable(&self, candidate: &Block, _previous: &Block) -> bool {
        candidate.height() >= self.activation_height
    }

    fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
        if self.allow_min_difficulty_blocks
            && is_min_difficulty_gap(candidate, previous, self.target_spacing)
        {
            return expect_bits(candidate, self.max_target_bits);
        }
        expect_bits(candidate, self.next_bits(previous)?)
    }
}
