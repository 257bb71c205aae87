//! # ASERT (aserti3-2d)
//!
//! Absolutely scheduled exponentially rising targets: the target doubles
//! for every half-life the chain falls behind the ideal schedule measured
//! from a fixed anchor block, and halves for every half-life it runs ahead.
//!
//! Computed in O(1) from the parent alone, in 16.16 fixed point:
//!
//! ```text
//! exponent = ((prev.ts - anchor.parent_time) - spacing * (prev.height - anchor.height + 1))
//!            * 65536 / half_life
//! factor   = 2^(frac / 65536) * 65536   (cubic approximation)
//! target   = anchor_target * factor >> (16 - shifts), clamped to [1, max]
//! ```

use primitive_types::{U256, U512};
use shared_types::Block;

use super::{expect_bits, is_min_difficulty_gap, BlockValidator};
use crate::config::NetworkParams;
use crate::domain::compact::cap_target;
use crate::domain::{decode_compact, encode_compact, AsertAnchor, ValidationError};

const RADIX_BITS: i64 = 16;

#[derive(Clone, Debug)]
pub struct AsertValidator {
    anchor: AsertAnchor,
    half_life: i64,
    target_spacing: u32,
    max_target_bits: u32,
    max_target: U256,
    allow_min_difficulty_blocks: bool,
}

impl AsertValidator {
    pub fn new(anchor: AsertAnchor, params: &NetworkParams) -> Self {
        Self {
            anchor,
            half_life: params.asert_half_life.max(1),
            target_spacing: params.target_spacing,
            max_target_bits: params.max_target_bits,
            max_target: params.max_target(),
            allow_min_difficulty_blocks: params.allow_min_difficulty_blocks,
        }
    }

    /// Target for the block after `previous`.
    pub fn next_target(&self, previous: &Block) -> U256 {
        let time_delta = i64::from(previous.timestamp()) - self.anchor.parent_time;
        let height_delta = i64::from(previous.height()) - i64::from(self.anchor.height) + 1;

        let exponent = (time_delta - i64::from(self.target_spacing) * height_delta)
            * (1 << RADIX_BITS)
            / self.half_life;

        // arithmetic shift floors toward negative infinity
        let mut shifts = exponent >> RADIX_BITS;
        let frac = u128::from(exponent as u16);

        let factor = 65_536
            + ((195_766_423_245_049 * frac
                + 971_821_376 * frac * frac
                + 5_127 * frac * frac * frac
                + (1u128 << 47))
                >> 48);

        let anchor_target = decode_compact(self.anchor.bits);
        let mut target = U512::from(anchor_target) * U512::from(factor as u64);

        shifts -= RADIX_BITS;
        if shifts <= 0 {
            let right = shifts.unsigned_abs();
            target = if right >= 512 {
                U512::zero()
            } else {
                target >> right as usize
            };
        } else if shifts >= 256 || target.bits() + shifts as usize > 512 {
            // would not fit in 512 bits; far above any limit
            return self.max_target;
        } else {
            target = target << shifts as usize;
        }

        if target.is_zero() {
            return U256::one();
        }
        cap_target(target, self.max_target)
    }

    pub fn next_bits(&self, previous: &Block) -> u32 {
        encode_compact(self.next_target(previous))
    }
}

impl BlockValidator for AsertValidator {
    fn is_applicable(&self, candidate: &Block, _previous: &Block) -> bool {
        candidate.height() >= self.anchor.activation_height()
    }

    fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
        if self.allow_min_difficulty_blocks
            && is_min_difficulty_gap(candidate, previous, self.target_spacing)
        {
            return expect_bits(candidate, self.max_target_bits);
        }
        expect_bits(candidate, self.next_bits(previous))
    }
}
