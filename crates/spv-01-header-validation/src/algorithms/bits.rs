//! Carry-over rule: between retargets the bits do not change.

use shared_types::Block;

use super::{expect_bits, BlockValidator};
use crate::domain::ValidationError;

#[derive(Clone, Debug, Default)]
pub struct BitsValidator;

impl BitsValidator {
    pub fn new() -> Self {
        Self
    }
}

impl BlockValidator for BitsValidator {
    fn is_applicable(&self, _candidate: &Block, _previous: &Block) -> bool {
        true
    }

    fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
        expect_bits(candidate, previous.bits())
    }
}
