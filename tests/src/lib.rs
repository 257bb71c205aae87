//! # SPV Core Test Suite
//!
//! Cross-crate scenarios: real and mined header chains through the
//! validation pipeline, and complete downloads through the sync actor
//! against serving peers.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs      # Wallet chains, serving peers, message pump
//!     ├── header_chain.rs  # Header acceptance across networks
//!     └── sync_flow.rs     # End-to-end initial block download
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p spv-tests
//! RUST_LOG=debug cargo test -p spv-tests sync_flow -- --nocapture
//! ```

pub mod integration;
