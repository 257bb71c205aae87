//! Fork guard: pins the header hash at one height, then defers to the
//! wrapped rule.

use shared_types::Block;
use tracing::warn;

use super::{BlockValidator, Validator};
use crate::domain::{Checkpoint, ValidationError};

#[derive(Clone)]
pub struct CheckpointValidator {
    checkpoint: Checkpoint,
    inner: Box<Validator>,
}

impl CheckpointValidator {
    pub fn new(checkpoint: Checkpoint, inner: impl Into<Validator>) -> Self {
        Self {
            checkpoint,
            inner: Box::new(inner.into()),
        }
    }

    pub fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }
}

impl BlockValidator for CheckpointValidator {
    fn is_applicable(&self, candidate: &Block, _previous: &Block) -> bool {
        candidate.height() == self.checkpoint.height
    }

    fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
        if candidate.hash() != self.checkpoint.hash {
            warn!(
                height = candidate.height(),
                block = %candidate,
                "Header does not match fork checkpoint"
            );
            return Err(ValidationError::WrongHeaderHash {
                height: candidate.height(),
                expected: self.checkpoint.hash,
                actual: candidate.hash(),
            });
        }
        self.inner.validate(candidate, previous)
    }
}
