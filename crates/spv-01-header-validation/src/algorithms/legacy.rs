//! # Legacy Periodic Retarget
//!
//! Every `height_interval` blocks the target is rescaled by how long the
//! previous period took, limited to a factor of four either way.
//!
//! The period is measured from `height_interval - 1` blocks before the parent,
//! so each window spans one block fewer than the interval (the historical
//! off-by-one is consensus).

use primitive_types::{U256, U512};
use shared_types::Block;

use super::BlockValidator;
use crate::config::NetworkParams;
use crate::domain::compact::cap_target;
use crate::domain::{decode_compact, encode_compact, ChainWindow, ValidationError};

#[derive(Clone)]
pub struct LegacyValidator {
    window: ChainWindow,
    height_interval: u32,
    target_timespan: i64,
    max_target: U256,
}

impl LegacyValidator {
    pub fn new(window: ChainWindow, params: &NetworkParams) -> Self {
        Self {
            window,
            height_interval: params.height_interval(),
            target_timespan: i64::from(params.target_timespan),
            max_target: params.max_target(),
        }
    }

    /// Bits the block after `previous` must carry at a retarget boundary.
    pub fn next_bits(&self, previous: &Block) -> Result<u32, ValidationError> {
        let lookback = self.height_interval - 1;
        let first = self
            .window
            .previous(previous, lookback)
            .ok_or_else(|| ValidationError::missing_below(previous.height(), lookback))?;

        let actual = i64::from(previous.timestamp()) - i64::from(first.timestamp());
        let timespan = actual.clamp(self.target_timespan / 4, self.target_timespan * 4);

        // timespan is positive after clamping
        let scaled = U512::from(decode_compact(previous.bits())) * U512::from(timespan as u64)
            / U512::from(self.target_timespan as u64);

        Ok(encode_compact(cap_target(scaled, self.max_target)))
    }

    pub fn is_retarget_height(&self, height: u32) -> bool {
        height % self.height_interval == 0
    }
}

impl BlockValidator for LegacyValidator {
    fn is_applicable(&self, candidate: &Block, _previous: &Block) -> bool {
        self.is_retarget_height(candidate.height())
    }

    fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
        let expected = self.next_bits(previous)?;
        if candidate.bits() != expected {
            return Err(ValidationError::NotDifficultyTransitionEqualBits {
                height: candidate.height(),
                expected,
                actual: candidate.bits(),
            });
        }
        Ok(())
    }
}
