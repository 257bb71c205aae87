//! # Inbound Ports
//!
//! Commands driving the initial block download. Peer callbacks and user
//! requests all become one of these and are handled in arrival order.

use shared_types::InventoryItem;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::domain::{CompletedTask, SyncStatus};

/// Input to the sync actor.
pub enum SyncCommand<P> {
    /// Begin electing peers and downloading.
    Start,
    /// Stop downloading. Peers stay connected.
    Stop,
    PeerConnected(Arc<P>),
    /// The peer finished its handshake.
    PeerReady { host: String },
    PeerDisconnected { host: String },
    /// The peer announced inventory.
    InventoryReceived { host: String, items: Vec<InventoryItem> },
    /// The peer answered a task.
    TaskCompleted { host: String, task: CompletedTask },
    Status { reply: oneshot::Sender<SyncStatus> },
}

impl<P> SyncCommand<P> {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::PeerConnected(_) => "peer_connected",
            Self::PeerReady { .. } => "peer_ready",
            Self::PeerDisconnected { .. } => "peer_disconnected",
            Self::InventoryReceived { .. } => "inventory_received",
            Self::TaskCompleted { .. } => "task_completed",
            Self::Status { .. } => "status",
        }
    }
}
