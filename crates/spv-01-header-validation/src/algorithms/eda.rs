//! # Emergency Difficulty Adjustment
//!
//! Between retargets, if the median time past advanced by 12 hours or more
//! over the last six blocks, the target eases by 25%. Otherwise bits carry
//! over. Once the target reaches the limit it stays there until a retarget.

use primitive_types::U256;
use shared_types::Block;

use super::{expect_bits, BlockValidator};
use crate::config::NetworkParams;
use crate::domain::{
    decode_compact, encode_compact, ChainWindow, ValidationError, EDA_LOOKBACK,
    EDA_TRIGGER_SECONDS,
};

#[derive(Clone)]
pub struct EdaValidator {
    window: ChainWindow,
    activation_height: u32,
    max_target_bits: u32,
    max_target: U256,
}

impl EdaValidator {
    pub fn new(window: ChainWindow, params: &NetworkParams) -> Self {
        Self {
            window,
            activation_height: params.eda_activation_height.unwrap_or(0),
            max_target_bits: params.max_target_bits,
            max_target: params.max_target(),
        }
    }

    /// Bits the block after `previous` must carry.
    pub fn next_bits(&self, previous: &Block) -> Result<u32, ValidationError> {
        if previous.bits() == self.max_target_bits {
            return Ok(self.max_target_bits);
        }

        let earlier = self
            .window
            .previous(previous, EDA_LOOKBACK)
            .ok_or_else(|| ValidationError::missing_below(previous.height(), EDA_LOOKBACK))?;

        let mtp_gap =
            self.window.median_time_past(previous) - self.window.median_time_past(&earlier);
        if mtp_gap < EDA_TRIGGER_SECONDS {
            return Ok(previous.bits());
        }

        let target = decode_compact(previous.bits());
        let eased = target.saturating_add(target >> 2).min(self.max_target);
        Ok(encode_compact(eased))
    }
}

impl BlockValidator for EdaValidator {
    fn is_applicable(&self, candidate: &Block, _previous: &Block) -> bool {
        candidate.height() >= self.activation_height
    }

    fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
        expect_bits(candidate, self.next_bits(previous)?)
    }
}
