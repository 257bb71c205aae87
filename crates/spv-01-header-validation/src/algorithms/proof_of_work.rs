//! Proof-of-work check: the header hash must be below its own target.

use primitive_types::U256;
use shared_types::Block;

use super::BlockValidator;
use crate::domain::{decode_compact, ValidationError};

#[derive(Clone, Debug)]
pub struct ProofOfWorkValidator {
    max_target: U256,
}

impl ProofOfWorkValidator {
    pub fn new(max_target: U256) -> Self {
        Self { max_target }
    }

    /// Whether `block`'s hash meets the target its bits claim.
    pub fn meets_target(&self, block: &Block) -> bool {
        let target = decode_compact(block.bits());
        if target.is_zero() || target > self.max_target {
            return false;
        }
        // the hash as a little-endian number is its display order read big-endian
        U256::from_little_endian(&block.hash()) < target
    }
}

impl BlockValidator for ProofOfWorkValidator {
    fn is_applicable(&self, _candidate: &Block, _previous: &Block) -> bool {
        true
    }

    fn validate(&self, candidate: &Block, _previous: &Block) -> Result<(), ValidationError> {
        if self.meets_target(candidate) {
            Ok(())
        } else {
            Err(ValidationError::InvalidProofOfWork {
                height: candidate.height(),
                hash: candidate.hash(),
            })
        }
    }
}
