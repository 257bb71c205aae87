//! # Ports Module
//!
//! Commands in, peer requests out.

pub mod inbound;
pub mod outbound;

pub use inbound::SyncCommand;
pub use outbound::{MockPeer, SyncPeer};
