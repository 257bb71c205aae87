//! # Initial Block Download
//!
//! Drives the download of headers and filtered blocks from one elected peer
//! at a time.
//!
//! ## Peer lifecycle
//!
//! ```text
//! connected ──elect──> headers syncing ──empty hashes──> headers synced
//!     ▲                                                        │
//!     │ new block inventory                      no pending blocks
//!     │                                                        ▼
//!     └──────────────────────────────────────────────── fully synced
//! ```
//!
//! - At most one peer holds the download slot. Election is a no-op while it
//!   is held and prefers the ready, unsynced peer with the highest announced
//!   height, then the earliest connection.
//! - Each iteration requests the next batch of pending filtered blocks and,
//!   until headers are synced, more block hashes from a fresh locator.
//! - A peer delivering invalid data is disconnected. Recoverable failures
//!   restart from a fresh locator until the peer exhausts its allowance.
//!
//! All state lives in one value mutated only through `&mut self`; the
//! service loop owns it.

use shared_bus::{EventPublisher, SyncEvent};
use shared_types::{BlockStore, FilteredBlock, Hash, InventoryItem};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use super::block_syncer::BlockSyncer;
use crate::config::SyncConfig;
use crate::domain::{CompletedTask, PeerSyncState, PeerTask, SyncError, SyncStatus};
use crate::ports::{SyncCommand, SyncPeer};

struct PeerEntry<P> {
    peer: Arc<P>,
    state: PeerSyncState,
}

/// Outcome of advancing the slot holder.
enum Progress {
    /// Requests are out, or the peer is busy.
    Waiting,
    /// The slot was released; elect again.
    Released,
}

/// Initial block download orchestrator.
pub struct InitialBlockDownload<P: SyncPeer> {
    config: SyncConfig,
    syncer: BlockSyncer,
    events: Arc<dyn EventPublisher>,
    peers: HashMap<String, PeerEntry<P>>,
    synced_peers: BTreeSet<String>,
    active: Option<String>,
    running: bool,
    next_seq: u64,
    ping_nonce: u64,
}

impl<P: SyncPeer> InitialBlockDownload<P> {
    pub fn new(
        config: SyncConfig,
        store: Arc<dyn BlockStore>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        let syncer = BlockSyncer::new(&config.params(), store);
        Self::with_syncer(config, syncer, events)
    }

    pub fn with_syncer(
        config: SyncConfig,
        syncer: BlockSyncer,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            config,
            syncer,
            events,
            peers: HashMap::new(),
            synced_peers: BTreeSet::new(),
            active: None,
            running: false,
            next_seq: 0,
            ping_nonce: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Host holding the download slot.
    pub fn active_peer(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn peer_state(&self, host: &str) -> Option<&PeerSyncState> {
        self.peers.get(host).map(|e| &e.state)
    }

    /// Peers we are caught up with.
    pub fn synced_peers(&self) -> &BTreeSet<String> {
        &self.synced_peers
    }

    pub fn syncer(&self) -> &BlockSyncer {
        &self.syncer
    }

    pub fn status(&self) -> SyncStatus {
        let mut connected_peers: Vec<String> = self.peers.keys().cloned().collect();
        connected_peers.sort();
        SyncStatus {
            running: self.running,
            active_peer: self.active.clone(),
            connected_peers,
            synced_peers: self.synced_peers.iter().cloned().collect(),
            pending_blocks: self.syncer.pending_len(),
            tip_height: self.syncer.tip_height(),
        }
    }

    pub async fn handle(&mut self, command: SyncCommand<P>) {
        trace!(command = command.name(), "Handling sync command");
        match command {
            SyncCommand::Start => self.start().await,
            SyncCommand::Stop => self.stop().await,
            SyncCommand::PeerConnected(peer) => self.peer_connected(peer).await,
            SyncCommand::PeerReady { host } => self.peer_ready(&host).await,
            SyncCommand::PeerDisconnected { host } => self.peer_disconnected(&host).await,
            SyncCommand::InventoryReceived { host, items } => {
                self.inventory_received(&host, &items).await
            }
            SyncCommand::TaskCompleted { host, task } => self.task_completed(&host, task).await,
            SyncCommand::Status { reply } => {
                if reply.send(self.status()).is_err() {
                    debug!("Status requester went away");
                }
            }
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    pub async fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        info!(peers = self.peers.len(), tip = ?self.syncer.tip_height(), "Starting initial block download");
        self.events.publish(SyncEvent::SyncStarted);
        self.schedule().await;
    }

    pub async fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Some(host) = self.active.take() {
            self.syncer.requeue_in_flight();
            debug!(peer = %host, "Released sync peer");
        }
        info!("Stopped initial block download");
        self.events.publish(SyncEvent::SyncStopped {
            reason: "stopped".to_string(),
        });
    }

    // =========================================================================
    // PEER EVENTS
    // =========================================================================

    pub async fn peer_connected(&mut self, peer: Arc<P>) {
        let host = peer.host().to_string();
        if self.peers.contains_key(&host) {
            warn!(peer = %host, "Peer already connected");
            return;
        }

        let state = PeerSyncState::new(&host, peer.is_ready(), peer.start_height(), self.next_seq);
        self.next_seq += 1;
        info!(
            peer = %host,
            height = state.announced_height,
            ready = state.ready,
            "Peer connected"
        );
        self.peers.insert(host, PeerEntry { peer, state });
        self.schedule().await;
    }

    pub async fn peer_ready(&mut self, host: &str) {
        let Some(state) = self.state_mut(host) else {
            debug!(peer = %host, "Ready signal from unknown peer");
            return;
        };
        state.ready = true;
        debug!(peer = %host, "Peer ready");
        self.schedule().await;
    }

    pub async fn peer_disconnected(&mut self, host: &str) {
        if self.peers.remove(host).is_none() {
            debug!(peer = %host, "Disconnect from unknown peer");
            return;
        }
        if self.synced_peers.remove(host) {
            debug!(peer = %host, "Synced peer left");
        }
        if self.active.as_deref() == Some(host) {
            self.active = None;
            self.syncer.requeue_in_flight();
            warn!(peer = %host, "Sync peer disconnected during download");
            self.events.publish(SyncEvent::DownloadFailed {
                peer: host.to_string(),
                reason: "disconnected".to_string(),
            });
        }
        info!(peer = %host, remaining = self.peers.len(), "Peer disconnected");

        if self.running && self.peers.len() < self.config.min_peers {
            warn!(remaining = self.peers.len(), "Not enough peers to sync");
            self.events.publish(SyncEvent::SyncStopped {
                reason: "no peers left".to_string(),
            });
        }
        self.schedule().await;
    }

    /// A peer that already gave us its headers announced blocks we do not
    /// have: roll it back so it is asked again.
    pub async fn inventory_received(&mut self, host: &str, items: &[InventoryItem]) {
        let store = self.syncer.store();
        let unknown = items
            .iter()
            .filter(|item| item.is_block() && !store.contains(&item.hash))
            .count();
        if unknown == 0 {
            return;
        }

        let Some(state) = self.state_mut(host) else {
            return;
        };
        if !state.headers_synced {
            trace!(peer = %host, unknown, "Inventory from peer still syncing");
            return;
        }
        state.roll_back();
        info!(peer = %host, unknown, "Peer announced new blocks, rolling back");

        if self.synced_peers.remove(host) {
            self.events.publish(SyncEvent::PeerNotSynced {
                peer: host.to_string(),
            });
        }
        if self.active.as_deref() == Some(host) {
            self.active = None;
            self.syncer.requeue_in_flight();
            debug!(peer = %host, "Released sync peer for re-election");
        }
        self.schedule().await;
    }

    pub async fn task_completed(&mut self, host: &str, task: CompletedTask) {
        let Some(state) = self.state_mut(host) else {
            debug!(peer = %host, "Completion from unknown peer");
            return;
        };
        state.outstanding_tasks = state.outstanding_tasks.saturating_sub(1);
        if state.rejected {
            return;
        }

        let is_active = self.active.as_deref() == Some(host);
        match task {
            CompletedTask::BlockHashes(hashes) if is_active => self.on_block_hashes(host, &hashes),
            CompletedTask::BlockHashes(hashes) => {
                debug!(peer = %host, count = hashes.len(), "Ignoring hashes from passive peer");
            }
            CompletedTask::MerkleBlocks(blocks) => {
                self.on_merkle_blocks(host, &blocks, is_active).await
            }
        }
        self.schedule().await;
    }

    // =========================================================================
    // RESPONSES
    // =========================================================================

    fn on_block_hashes(&mut self, host: &str, hashes: &[Hash]) {
        let added = self.syncer.add_block_hashes(hashes);
        let tip = self.syncer.tip_height();
        let Some(state) = self.state_mut(host) else {
            return;
        };
        if added == 0 {
            state.headers_synced = true;
            info!(peer = %host, tip = ?tip, "Headers synced");
        } else {
            debug!(peer = %host, received = hashes.len(), added, "Received block hashes");
        }
    }

    async fn on_merkle_blocks(&mut self, host: &str, blocks: &[FilteredBlock], is_active: bool) {
        let mut verified = 0usize;
        for block in blocks {
            match self.syncer.handle_filtered_block(block) {
                Ok(Some(v)) => {
                    verified += 1;
                    self.events.publish(SyncEvent::BlockVerified(v));
                }
                Ok(None) => {}
                Err(e) => {
                    self.on_batch_failure(host, e, is_active).await;
                    return;
                }
            }
        }
        if verified > 0 {
            if let Some(state) = self.state_mut(host) {
                state.recoverable_failures = 0;
            }
        }
        if !is_active {
            debug!(peer = %host, verified, "Filtered blocks from passive peer");
            return;
        }

        let skipped = self.syncer.drop_in_flight();
        if skipped > 0 {
            debug!(peer = %host, skipped, "Peer did not deliver every requested block");
            if let Some(state) = self.state_mut(host) {
                state.headers_synced = false;
            }
        }
        debug!(peer = %host, verified, tip = ?self.syncer.tip_height(), "Download iteration completed");
        self.events.publish(SyncEvent::DownloadIterationCompleted {
            peer: host.to_string(),
            blocks: verified,
        });
    }

    async fn on_batch_failure(&mut self, host: &str, error: SyncError, is_active: bool) {
        if error.is_consensus_violation() {
            self.reject_peer(host, &error).await;
            return;
        }

        let limit = self.config.max_recoverable_failures;
        let Some(state) = self.state_mut(host) else {
            return;
        };
        state.recoverable_failures += 1;
        let failures = state.recoverable_failures;
        if failures > limit {
            self.reject_peer(host, &error).await;
            return;
        }
        if !is_active {
            debug!(peer = %host, error = %error, "Passive peer batch failed");
            return;
        }
        state.headers_synced = false;
        self.syncer.clear_pending();
        warn!(peer = %host, error = %error, failures, "Batch failed, restarting from a fresh locator");
    }

    async fn reject_peer(&mut self, host: &str, error: &SyncError) {
        let reason = error.to_string();
        let Some(entry) = self.peers.get_mut(host) else {
            return;
        };
        entry.state.rejected = true;
        let peer = Arc::clone(&entry.peer);
        warn!(peer = %host, error = %reason, "Rejecting peer");

        self.synced_peers.remove(host);
        if self.active.as_deref() == Some(host) {
            self.active = None;
            self.syncer.clear_pending();
            self.events.publish(SyncEvent::DownloadFailed {
                peer: host.to_string(),
                reason: reason.clone(),
            });
        }
        peer.disconnect(&reason).await;
    }

    // =========================================================================
    // SCHEDULING
    // =========================================================================

    /// Keep the slot busy: advance its holder or elect a new one.
    async fn schedule(&mut self) {
        while self.running {
            let host = match self.active.clone() {
                Some(host) => host,
                None => match self.elect().await {
                    Some(host) => host,
                    None => return,
                },
            };
            match self.advance(&host).await {
                Progress::Waiting => return,
                Progress::Released => continue,
            }
        }
    }

    async fn elect(&mut self) -> Option<String> {
        let host = self
            .peers
            .values()
            .filter(|e| e.state.is_candidate())
            .max_by_key(|e| e.state.election_key())
            .map(|e| e.state.host.clone());
        let Some(host) = host else {
            trace!(peers = self.peers.len(), "No peer to elect");
            return None;
        };

        self.active = Some(host.clone());
        info!(peer = %host, "Elected sync peer");
        self.events.publish(SyncEvent::DownloadStarted { peer: host.clone() });
        Some(host)
    }

    async fn advance(&mut self, host: &str) -> Progress {
        let (peer, wants_headers) = match self.peers.get(host) {
            Some(entry) if entry.state.is_available() => {
                (Arc::clone(&entry.peer), !entry.state.headers_synced)
            }
            Some(_) => return Progress::Waiting,
            None => {
                self.active = None;
                return Progress::Released;
            }
        };

        let batch = self.syncer.next_batch(self.config.merkle_batch_size);
        if batch.is_empty() && !wants_headers {
            self.complete(host, &peer).await;
            return Progress::Released;
        }

        let mut sent = 0;
        if !batch.is_empty() {
            debug!(peer = %host, count = batch.len(), "Requesting filtered blocks");
            peer.add_task(PeerTask::GetMerkleBlocks { hashes: batch }).await;
            sent += 1;
        }
        if wants_headers {
            let locator = self.syncer.locator();
            debug!(peer = %host, locator = locator.len(), "Requesting block hashes");
            peer.add_task(PeerTask::GetBlockHashes { locator }).await;
            sent += 1;
        }
        self.ping_nonce = self.ping_nonce.wrapping_add(1);
        peer.send_ping(self.ping_nonce).await;

        if let Some(state) = self.state_mut(host) {
            state.outstanding_tasks += sent;
        }
        Progress::Waiting
    }

    async fn complete(&mut self, host: &str, peer: &Arc<P>) {
        if let Some(state) = self.state_mut(host) {
            state.headers_synced = true;
            state.filtered_blocks_synced = true;
            state.recoverable_failures = 0;
        }
        self.synced_peers.insert(host.to_string());
        self.active = None;
        info!(peer = %host, tip = ?self.syncer.tip_height(), "Download completed");

        self.events.publish(SyncEvent::DownloadCompleted {
            peer: host.to_string(),
        });
        self.events.publish(SyncEvent::PeerSynced {
            peer: host.to_string(),
        });
        peer.request_mempool().await;
        self.events.publish(SyncEvent::SyncFinished);
    }

    fn state_mut(&mut self, host: &str) -> Option<&mut PeerSyncState> {
        self.peers.get_mut(host).map(|e| &mut e.state)
    }
}
