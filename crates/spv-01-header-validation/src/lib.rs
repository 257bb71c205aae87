//! # Header Validation (SPV)
//!
//! Decides whether a header received from an untrusted peer may extend the
//! locally stored chain.
//!
//! ## Components
//!
//! - **Compact targets**: `nBits` <-> 256-bit target, block work
//! - **Chain window**: ancestor, window and median-time queries over storage
//! - **Validators**: proof of work, legacy retarget, EDA, cw-144 DAA, ASERT,
//!   legacy test-network rule, carry-over bits, checkpoint fork guard
//! - **Pipeline**: chain (first applicable) and set (all) combinators,
//!   assembled per network by [`build_validator`]
//! - **Acceptor**: parent lookup, validation and append in one call
//!
//! ## Example
//!
//! ```rust
//! use spv_01_header_validation::{decode_compact, encode_compact};
//!
//! let target = decode_compact(0x1d00ffff);
//! assert_eq!(encode_compact(target), 0x1d00ffff);
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;

/// Mined-chain builders. Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use algorithms::{
    AsertValidator, BitsValidator, BlockValidator, CheckpointValidator, DaaValidator,
    EdaValidator, LegacyValidator, ProofOfWorkValidator, TestNetValidator, Validator,
    ValidatorChain, ValidatorSet,
};
pub use application::{build_validator, difficulty_chain, HeaderAcceptor};
pub use config::{Network, NetworkParams};
pub use domain::{
    block_work, decode_compact, encode_compact, AsertAnchor, ChainWindow, Checkpoint,
    ValidationError,
};
