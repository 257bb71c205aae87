//! # Header Acceptor
//!
//! The single entry point through which headers reach storage: locate the
//! parent, run the network pipeline, append.

use shared_types::{Block, BlockHeader, BlockStore};
use std::sync::Arc;
use tracing::{debug, warn};

use super::networks::build_validator;
use crate::algorithms::{BlockValidator, Validator};
use crate::config::NetworkParams;
use crate::domain::{ChainWindow, ValidationError};

/// Validates headers against the stored chain and appends them.
pub struct HeaderAcceptor {
    store: Arc<dyn BlockStore>,
    validator: Validator,
}

impl HeaderAcceptor {
    /// Acceptor using the pipeline `params` call for.
    pub fn new(params: &NetworkParams, store: Arc<dyn BlockStore>) -> Self {
        let validator = build_validator(params, ChainWindow::new(Arc::clone(&store)));
        Self { store, validator }
    }

    /// Acceptor with a caller-assembled pipeline.
    pub fn with_validator(store: Arc<dyn BlockStore>, validator: Validator) -> Self {
        Self { store, validator }
    }

    pub fn store(&self) -> &Arc<dyn BlockStore> {
        &self.store
    }

    /// Validate `header` and append it to the chain.
    ///
    /// Returns the stored block. A header that is already stored is returned
    /// as-is without re-validation.
    pub fn accept(&self, header: &BlockHeader) -> Result<Block, ValidationError> {
        let hash = header.hash();
        if let Some(existing) = self.store.block_by_hash(&hash) {
            debug!(block = %existing, "Header already stored");
            return Ok(existing);
        }

        let parent = self
            .store
            .block_by_hash(&header.prev_hash)
            .ok_or_else(|| ValidationError::missing_parent(&header.prev_hash))?;

        if let Some(tip) = self.store.last_block() {
            if tip.hash() != parent.hash() {
                return Err(ValidationError::ForkedHeader {
                    height: parent.height() + 1,
                    tip_height: tip.height(),
                });
            }
        }

        let candidate = Block::new(*header, parent.height() + 1);
        if let Err(e) = self.validator.validate(&candidate, &parent) {
            warn!(block = %candidate, error = %e, "Header rejected");
            return Err(e);
        }

        self.store.add_block(candidate.clone())?;
        debug!(block = %candidate, "Header accepted");
        Ok(candidate)
    }

    /// Run the pipeline on a pair without touching storage.
    pub fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
        self.validator.validate(candidate, previous)
    }
}
