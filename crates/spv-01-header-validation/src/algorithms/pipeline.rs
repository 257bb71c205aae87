//! # Validator Pipeline
//!
//! - [`ValidatorChain`]: the first applicable member decides.
//! - [`ValidatorSet`]: every member runs and must pass.
//!
//! Both are validators themselves, so they nest.

use shared_types::Block;
use tracing::{error, trace};

use super::{BlockValidator, Validator};
use crate::domain::ValidationError;

/// Ordered rules; the first applicable one validates.
#[derive(Clone, Default)]
pub struct ValidatorChain {
    validators: Vec<Validator>,
}

impl ValidatorChain {
    pub fn new(validators: Vec<Validator>) -> Self {
        Self { validators }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    fn select(&self, candidate: &Block, previous: &Block) -> Option<&Validator> {
        self.validators
            .iter()
            .find(|validator| validator.is_applicable(candidate, previous))
    }
}

impl BlockValidator for ValidatorChain {
    fn is_applicable(&self, candidate: &Block, previous: &Block) -> bool {
        self.select(candidate, previous).is_some()
    }

    fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
        match self.select(candidate, previous) {
            Some(validator) => {
                trace!(height = candidate.height(), rule = validator.name(), "Validating header");
                validator.validate(candidate, previous)
            }
            None => {
                // misconfigured pipeline; nothing to enforce
                error!(
                    height = candidate.height(),
                    block = %candidate,
                    "No applicable validator for header"
                );
                Ok(())
            }
        }
    }
}

/// Rules that must all hold.
#[derive(Clone, Default)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    pub fn new(validators: Vec<Validator>) -> Self {
        Self { validators }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl BlockValidator for ValidatorSet {
    fn is_applicable(&self, _candidate: &Block, _previous: &Block) -> bool {
        true
    }

    /// Runs every member regardless of its own applicability.
    fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
        self.validators
            .iter()
            .try_for_each(|validator| validator.validate(candidate, previous))
    }
}
