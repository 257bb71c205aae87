//! # Application Layer
//!
//! Block syncer, download orchestrator and the actor that runs it.

pub mod block_syncer;
pub mod ibd;
pub mod service;

pub use block_syncer::BlockSyncer;
pub use ibd::InitialBlockDownload;
pub use service::{SyncHandle, SyncService};
