//! # Legacy Test-Network Rule
//!
//! Between retargets a test-network block must carry the bits of the nearest
//! ancestor that is below the limit or sits on a retarget boundary, skipping
//! runs of maximum-difficulty blocks. When the network allows minimum
//! difficulty blocks, a block arriving more than two spacings after its parent
//! carries the limit instead. Retarget boundaries follow the legacy rule.

use shared_types::Block;

use super::{expect_bits, is_min_difficulty_gap, BlockValidator, LegacyValidator};
use crate::config::NetworkParams;
use crate::domain::{ChainWindow, ValidationError};

#[derive(Clone)]
pub struct TestNetValidator {
    window: ChainWindow,
    legacy: LegacyValidator,
    height_interval: u32,
    target_spacing: u32,
    max_target_bits: u32,
    allow_min_difficulty_blocks: bool,
}

impl TestNetValidator {
    pub fn new(window: ChainWindow, params: &NetworkParams) -> Self {
        Self {
            legacy: LegacyValidator::new(window.clone(), params),
            window,
            height_interval: params.height_interval(),
            target_spacing: params.target_spacing,
            max_target_bits: params.max_target_bits,
            allow_min_difficulty_blocks: params.allow_min_difficulty_blocks,
        }
    }

    /// Nearest ancestor (from `previous` down) that is below the limit or on
    /// a retarget boundary.
    fn last_regular_block(&self, previous: &Block) -> Result<Block, ValidationError> {
        let mut cursor = previous.clone();
        while cursor.height() % self.height_interval != 0 && cursor.bits() == self.max_target_bits
        {
            cursor = self
                .window
                .previous(&cursor, 1)
                .ok_or_else(|| ValidationError::missing_below(cursor.height(), 1))?;
        }
        Ok(cursor)
    }
}

impl BlockValidator for TestNetValidator {
    fn is_applicable(&self, _candidate: &Block, _previous: &Block) -> bool {
        true
    }

    fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
        if self.legacy.is_retarget_height(candidate.height()) {
            return self.legacy.validate(candidate, previous);
        }
        if self.allow_min_difficulty_blocks
            && is_min_difficulty_gap(candidate, previous, self.target_spacing)
        {
            return expect_bits(candidate, self.max_target_bits);
        }
        let regular = self.last_regular_block(previous)?;
        expect_bits(candidate, regular.bits())
    }
}
