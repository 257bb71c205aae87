//! # Network Pipelines
//!
//! Assembles the validator pipeline a network's parameters call for.
//!
//! ```text
//! Set[ ProofOfWork,
//!      Chain[ Guard(rest)?, Asert?, Daa?, Legacy, Eda?, TestNet | Bits ] ]
//! ```
//!
//! | network              | difficulty chain                                  |
//! |----------------------|---------------------------------------------------|
//! | Bitcoin mainnet      | Legacy, Bits                                      |
//! | Bitcoin testnet      | Legacy, TestNet                                   |
//! | Bitcoin Cash mainnet | Guard, Asert, Daa, Legacy, Eda, Bits              |
//! | Bitcoin Cash testnet | Asert, Daa, Legacy, Eda, Bits                     |
//!
//! The fork guard wraps the remaining chain, so at its height it defers to
//! whichever rule governs there (ASERT on Bitcoin Cash).

use crate::algorithms::{
    AsertValidator, BitsValidator, CheckpointValidator, DaaValidator, EdaValidator,
    LegacyValidator, ProofOfWorkValidator, TestNetValidator, Validator, ValidatorChain,
    ValidatorSet,
};
use crate::config::NetworkParams;
use crate::domain::ChainWindow;

/// Build the full header pipeline for `params`.
pub fn build_validator(params: &NetworkParams, window: ChainWindow) -> Validator {
    let difficulty = difficulty_chain(params, window);
    ValidatorSet::new(vec![
        ProofOfWorkValidator::new(params.max_target()).into(),
        difficulty.into(),
    ])
    .into()
}

/// The difficulty rules alone, without proof of work.
pub fn difficulty_chain(params: &NetworkParams, window: ChainWindow) -> ValidatorChain {
    let mut rules: Vec<Validator> = Vec::new();

    if let Some(anchor) = params.asert_anchor {
        rules.push(AsertValidator::new(anchor, params).into());
    }
    if params.daa_activation_height.is_some() {
        rules.push(DaaValidator::new(window.clone(), params).into());
    }
    rules.push(LegacyValidator::new(window.clone(), params).into());
    if params.eda_activation_height.is_some() {
        rules.push(EdaValidator::new(window.clone(), params).into());
    }
    if params.legacy_testnet_rule {
        rules.push(TestNetValidator::new(window, params).into());
    } else {
        rules.push(BitsValidator::new().into());
    }

    if let Some(checkpoint) = params.fork_checkpoint {
        let guard = CheckpointValidator::new(checkpoint, ValidatorChain::new(rules.clone()));
        rules.insert(0, guard.into());
    }

    ValidatorChain::new(rules)
}
