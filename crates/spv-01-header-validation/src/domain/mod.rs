//! # Domain Layer
//!
//! Compact targets, chain access, errors and consensus constants.

pub mod chain_window;
pub mod compact;
pub mod errors;
pub mod value_objects;

pub use chain_window::{ChainWindow, MEDIAN_TIME_SPAN};
pub use compact::{block_work, decode_compact, encode_compact};
pub use errors::ValidationError;
pub use value_objects::{AsertAnchor, Checkpoint};

/// Seconds of median-time-past gap that trigger an emergency adjustment.
pub const EDA_TRIGGER_SECONDS: i64 = 12 * 60 * 60;

/// Ancestors (before the candidate's parent) the emergency rule compares against.
pub const EDA_LOOKBACK: u32 = 6;

/// Blocks in the cw-144 work window.
pub const DAA_WINDOW: u32 = 144;

/// ASERT half-life: two days.
pub const ASERT_HALF_LIFE: i64 = 2 * 24 * 60 * 60;
