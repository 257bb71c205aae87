//! # Outbound Ports
//!
//! What the orchestrator needs from a connected peer.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::PeerTask;

/// A connected peer able to serve headers and filtered blocks.
///
/// Peers are identified by host; two handles with the same host are the
/// same peer. Calls are fire-and-forget: answers to [`add_task`] come back
/// later as task-completed commands.
///
/// [`add_task`]: SyncPeer::add_task
#[async_trait]
pub trait SyncPeer: Send + Sync + 'static {
    fn host(&self) -> &str;

    /// Handshake finished and the peer accepts tasks.
    fn is_ready(&self) -> bool;

    /// Chain height the peer announced during the handshake.
    fn start_height(&self) -> u32;

    /// Queue a request on the peer.
    async fn add_task(&self, task: PeerTask);

    /// Liveness probe that goes out with every request.
    async fn send_ping(&self, nonce: u64);

    /// Ask for the peer's mempool, filtered by our bloom filter.
    async fn request_mempool(&self);

    async fn disconnect(&self, reason: &str);
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

#[derive(Debug, Default)]
struct MockPeerLog {
    tasks: Vec<PeerTask>,
    pings: Vec<u64>,
    mempool_requests: usize,
    disconnected: Option<String>,
}

/// Mock peer that records every call.
#[derive(Debug)]
pub struct MockPeer {
    host: String,
    ready: bool,
    start_height: u32,
    log: Mutex<MockPeerLog>,
}

impl MockPeer {
    /// Ready peer announcing height 0.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ready: true,
            start_height: 0,
            log: Mutex::new(MockPeerLog::default()),
        }
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.start_height = height;
        self
    }

    /// Peer still in its handshake.
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn tasks(&self) -> Vec<PeerTask> {
        self.log.lock().tasks.clone()
    }

    /// Remove and return the recorded tasks.
    pub fn take_tasks(&self) -> Vec<PeerTask> {
        std::mem::take(&mut self.log.lock().tasks)
    }

    pub fn pings(&self) -> Vec<u64> {
        self.log.lock().pings.clone()
    }

    pub fn mempool_requests(&self) -> usize {
        self.log.lock().mempool_requests
    }

    pub fn disconnect_reason(&self) -> Option<String> {
        self.log.lock().disconnected.clone()
    }
}

#[async_trait]
impl SyncPeer for MockPeer {
    fn host(&self) -> &str {
        &self.host
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn start_height(&self) -> u32 {
        self.start_height
    }

    async fn add_task(&self, task: PeerTask) {
        self.log.lock().tasks.push(task);
    }

    async fn send_ping(&self, nonce: u64) {
        self.log.lock().pings.push(nonce);
    }

    async fn request_mempool(&self) {
        self.log.lock().mempool_requests += 1;
    }

    async fn disconnect(&self, reason: &str) {
        self.log.lock().disconnected = Some(reason.to_string());
    }
}
