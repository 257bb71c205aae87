//! # Header Validators
//!
//! One validator per consensus rule, plus the chain/set combinators that
//! assemble them into a per-network pipeline.
//!
//! Every validator answers two questions about a candidate header and its
//! parent: does this rule govern the pair ([`BlockValidator::is_applicable`]),
//! and does the pair satisfy it ([`BlockValidator::validate`]).

pub mod asert;
pub mod bits;
pub mod checkpoint;
pub mod daa;
pub mod eda;
pub mod legacy;
pub mod pipeline;
pub mod proof_of_work;
pub mod testnet;

pub use asert::AsertValidator;
pub use bits::BitsValidator;
pub use checkpoint::CheckpointValidator;
pub use daa::DaaValidator;
pub use eda::EdaValidator;
pub use legacy::LegacyValidator;
pub use pipeline::{ValidatorChain, ValidatorSet};
pub use proof_of_work::ProofOfWorkValidator;
pub use testnet::TestNetValidator;

use shared_types::Block;

use crate::domain::ValidationError;

/// A consensus rule over a (candidate, parent) pair.
pub trait BlockValidator {
    fn is_applicable(&self, candidate: &Block, previous: &Block) -> bool;

    fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError>;
}

/// The closed set of validators a pipeline is built from.
#[derive(Clone)]
pub enum Validator {
    ProofOfWork(ProofOfWorkValidator),
    Bits(BitsValidator),
    Legacy(LegacyValidator),
    Eda(EdaValidator),
    Daa(DaaValidator),
    Asert(AsertValidator),
    TestNet(TestNetValidator),
    Checkpoint(CheckpointValidator),
    Chain(ValidatorChain),
    Set(ValidatorSet),
}

impl Validator {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProofOfWork(_) => "pow",
            Self::Bits(_) => "bits",
            Self::Legacy(_) => "legacy",
            Self::Eda(_) => "eda",
            Self::Daa(_) => "daa",
            Self::Asert(_) => "asert",
            Self::TestNet(_) => "testnet",
            Self::Checkpoint(_) => "checkpoint",
            Self::Chain(_) => "chain",
            Self::Set(_) => "set",
        }
    }

    fn inner(&self) -> &dyn BlockValidator {
        match self {
            Self::ProofOfWork(v) => v,
            Self::Bits(v) => v,
            Self::Legacy(v) => v,
            Self::Eda(v) => v,
            Self::Daa(v) => v,
            Self::Asert(v) => v,
            Self::TestNet(v) => v,
            Self::Checkpoint(v) => v,
            Self::Chain(v) => v,
            Self::Set(v) => v,
        }
    }
}

impl BlockValidator for Validator {
    fn is_applicable(&self, candidate: &Block, previous: &Block) -> bool {
        self.inner().is_applicable(candidate, previous)
    }

    fn validate(&self, candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
        self.inner().validate(candidate, previous)
    }
}

macro_rules! impl_from_validator {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Validator {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_validator! {
    ProofOfWork => ProofOfWorkValidator,
    Bits => BitsValidator,
    Legacy => LegacyValidator,
    Eda => EdaValidator,
    Daa => DaaValidator,
    Asert => AsertValidator,
    TestNet => TestNetValidator,
    Checkpoint => CheckpointValidator,
    Chain => ValidatorChain,
    Set => ValidatorSet,
}

/// Compare expected and actual bits.
pub(crate) fn expect_bits(candidate: &Block, expected: u32) -> Result<(), ValidationError> {
    if candidate.bits() == expected {
        Ok(())
    } else {
        Err(ValidationError::NotEqualBits {
            height: candidate.height(),
            expected,
            actual: candidate.bits(),
        })
    }
}

/// Maximum-target exception: a block more than two spacings after its parent.
pub(crate) fn is_min_difficulty_gap(candidate: &Block, previous: &Block, spacing: u32) -> bool {
    i64::from(candidate.timestamp()) > i64::from(previous.timestamp()) + 2 * i64::from(spacing)
}
