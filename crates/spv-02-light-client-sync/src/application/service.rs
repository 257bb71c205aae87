//! # Sync Service
//!
//! Runs the [`InitialBlockDownload`] on its own task. Everything that
//! touches orchestration state arrives as a [`SyncCommand`] through one
//! channel, so commands are applied strictly in order.

use shared_bus::EventPublisher;
use shared_types::{BlockStore, InventoryItem};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::ibd::InitialBlockDownload;
use crate::config::SyncConfig;
use crate::domain::{CompletedTask, SyncError, SyncStatus};
use crate::ports::{SyncCommand, SyncPeer};

/// Spawns the sync actor.
pub struct SyncService;

impl SyncService {
    /// Start the actor on the current tokio runtime.
    pub fn spawn<P: SyncPeer>(
        config: SyncConfig,
        store: Arc<dyn BlockStore>,
        events: Arc<dyn EventPublisher>,
    ) -> (SyncHandle<P>, JoinHandle<()>) {
        let capacity = config.command_capacity.max(1);
        let ibd = InitialBlockDownload::new(config, store, events);
        Self::spawn_with(ibd, capacity)
    }

    /// Start the actor around an already assembled orchestrator.
    pub fn spawn_with<P: SyncPeer>(
        ibd: InitialBlockDownload<P>,
        capacity: usize,
    ) -> (SyncHandle<P>, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::channel(capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run(ibd, commands_rx, shutdown_rx));
        let handle = SyncHandle {
            commands: commands_tx,
            shutdown: Arc::new(shutdown_tx),
        };
        (handle, task)
    }
}

async fn run<P: SyncPeer>(
    mut ibd: InitialBlockDownload<P>,
    mut commands: mpsc::Receiver<SyncCommand<P>>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Sync service started");
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => ibd.handle(command).await,
                None => {
                    debug!("All sync handles dropped");
                    break;
                }
            },
            _ = shutdown.changed() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }
    ibd.stop().await;
    info!("Sync service stopped");
}

/// Cloneable sender side of the sync actor.
pub struct SyncHandle<P> {
    commands: mpsc::Sender<SyncCommand<P>>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl<P> Clone for SyncHandle<P> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            shutdown: Arc::clone(&self.shutdown),
        }
    }
}

impl<P: SyncPeer> SyncHandle<P> {
    pub async fn send(&self, command: SyncCommand<P>) -> Result<(), SyncError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SyncError::ChannelClosed)
    }

    pub async fn start(&self) -> Result<(), SyncError> {
        self.send(SyncCommand::Start).await
    }

    pub async fn stop(&self) -> Result<(), SyncError> {
        self.send(SyncCommand::Stop).await
    }

    pub async fn peer_connected(&self, peer: Arc<P>) -> Result<(), SyncError> {
        self.send(SyncCommand::PeerConnected(peer)).await
    }

    pub async fn peer_ready(&self, host: impl Into<String>) -> Result<(), SyncError> {
        self.send(SyncCommand::PeerReady { host: host.into() })
            .await
    }

    pub async fn peer_disconnected(&self, host: impl Into<String>) -> Result<(), SyncError> {
        self.send(SyncCommand::PeerDisconnected { host: host.into() })
            .await
    }

    pub async fn inventory_received(
        &self,
        host: impl Into<String>,
        items: Vec<InventoryItem>,
    ) -> Result<(), SyncError> {
        self.send(SyncCommand::InventoryReceived {
            host: host.into(),
            items,
        })
        .await
    }

    pub async fn task_completed(
        &self,
        host: impl Into<String>,
        task: CompletedTask,
    ) -> Result<(), SyncError> {
        self.send(SyncCommand::TaskCompleted {
            host: host.into(),
            task,
        })
        .await
    }

    /// Snapshot of the orchestrator after every command sent before it.
    pub async fn status(&self) -> Result<SyncStatus, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.send(SyncCommand::Status { reply }).await?;
        rx.await.map_err(|_| SyncError::ChannelClosed)
    }

    /// Ask the actor to stop. Commands already queued may be dropped.
    pub fn shutdown(&self) {
        if self.shutdown.send(true).is_err() {
            error!("Sync service already stopped");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}
