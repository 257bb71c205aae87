//! # Test Fixtures
//!
//! Chains carrying wallet transactions, and a peer that serves them by
//! answering tasks through the sync handle.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{
    double_sha256, hash_from_display_hex, Block, BlockHeader, FilteredBlock, Hash, Transaction,
};
use spv_01_header_validation::test_utils::{genesis, mine};
use spv_02_light_client_sync::{
    build_partial_tree, compute_merkle_root, CompletedTask, PeerTask, SyncHandle, SyncPeer,
};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Regtest spacing that keeps every retarget at the limit.
pub const SPACING: u32 = 700;

/// Install a test-friendly subscriber once. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// CHAINS
// =============================================================================

/// Blocks with the filtered view a serving peer hands out.
#[derive(Clone)]
pub struct TestChain {
    pub blocks: Vec<Block>,
    pub filtered: Vec<FilteredBlock>,
}

impl TestChain {
    pub fn tip(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn height(&self) -> u32 {
        self.tip().height()
    }

    /// Wallet transactions in the chain, in block order.
    pub fn wallet_transactions(&self) -> Vec<Hash> {
        self.filtered
            .iter()
            .flat_map(|fb| fb.transactions.iter().map(|tx| tx.hash))
            .collect()
    }

    /// Append `count` mined blocks; every third height pays the wallet.
    pub fn extend(&mut self, count: u32) {
        for _ in 0..count {
            let parent = self.tip().clone();
            let (block, filtered) = wallet_block(&parent, parent.bits());
            self.blocks.push(block);
            self.filtered.push(filtered);
        }
    }

    /// Copy of the chain up to `height`, then a block at `height + 1`
    /// carrying `bits` and `extra` blocks on top of it.
    pub fn fork_with_bits(&self, height: u32, bits: u32, extra: u32) -> TestChain {
        let keep = height as usize + 1;
        let mut fork = TestChain {
            blocks: self.blocks[..keep].to_vec(),
            filtered: self.filtered[..keep].to_vec(),
        };
        let (block, filtered) = wallet_block(fork.tip(), bits);
        fork.blocks.push(block);
        fork.filtered.push(filtered);
        fork.extend(extra);
        fork
    }
}

fn coinbase_id(height: u32) -> Hash {
    double_sha256(format!("coinbase {height}").as_bytes())
}

fn wallet_block(parent: &Block, bits: u32) -> (Block, FilteredBlock) {
    let height = parent.height() + 1;
    let payment = Transaction::from_raw(format!("wallet payment {height}").into_bytes());
    let filler = double_sha256(format!("filler {height}").as_bytes());
    let txids = [coinbase_id(height), payment.hash, filler];
    let pays_wallet = height % 3 == 0;

    let block = mine(Block::new(
        BlockHeader {
            version: 1,
            prev_hash: parent.hash(),
            merkle_root: compute_merkle_root(&txids),
            timestamp: parent.timestamp() + SPACING,
            bits,
            nonce: 0,
        },
        height,
    ));
    let filtered = FilteredBlock {
        header: *block.header(),
        tree: build_partial_tree(&txids, &[false, pays_wallet]),
        transactions: if pays_wallet { vec![payment] } else { vec![] },
    };
    (block, filtered)
}

/// Regtest chain of `count` blocks from the shared test genesis.
pub fn wallet_chain(count: u32) -> TestChain {
    let genesis = genesis();
    let filtered = FilteredBlock {
        header: *genesis.header(),
        tree: build_partial_tree(&[genesis.header().merkle_root], &[false]),
        transactions: vec![],
    };
    let mut chain = TestChain {
        blocks: vec![genesis],
        filtered: vec![filtered],
    };
    chain.extend(count.saturating_sub(1));
    chain
}

/// Bitcoin mainnet genesis and blocks 1 to 3. Each holds only its coinbase,
/// so the merkle root is the coinbase txid.
pub fn mainnet_chain() -> TestChain {
    let headers = [
        (
            "0000000000000000000000000000000000000000000000000000000000000000",
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b",
            1_231_006_505,
            2_083_236_893,
        ),
        (
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f",
            "0e3e2357e806b6cdb1f70b54c3a3a17b6714ee1f0e68bebb44a74b1efd512098",
            1_231_469_665,
            2_573_394_689,
        ),
        (
            "00000000839a8e6886ab5951d76f411475428afc90947ee320161bbf18eb6048",
            "9b0fc92260312ce44e74ef369f5c66bbb85848f2eddd5a7a1cde251e54ccfdd5",
            1_231_469_744,
            1_639_830_024,
        ),
        (
            "000000006a625f06636b8bb6ac7b960a8d03705d1ace08b1a19da3fdcc99ddbd",
            "999e1c837c76a1b7fbb7e57baf87b309960f5ffefbf2a9b95dd890602272f644",
            1_231_470_173,
            1_844_305_925,
        ),
    ];

    let mut chain = TestChain {
        blocks: Vec::new(),
        filtered: Vec::new(),
    };
    for (height, (prev, merkle, timestamp, nonce)) in headers.into_iter().enumerate() {
        let header = BlockHeader {
            version: 1,
            prev_hash: hash_from_display_hex(prev).unwrap(),
            merkle_root: hash_from_display_hex(merkle).unwrap(),
            timestamp,
            bits: 0x1d00ffff,
            nonce,
        };
        chain.blocks.push(Block::new(header, height as u32));
        chain.filtered.push(FilteredBlock {
            header,
            tree: build_partial_tree(&[header.merkle_root], &[true]),
            transactions: vec![],
        });
    }
    chain
}

// =============================================================================
// SERVING PEER
// =============================================================================

/// What a serving peer reports back to the sync actor.
#[derive(Debug)]
pub enum PeerMessage {
    Completed { host: String, task: CompletedTask },
    Disconnected { host: String },
}

/// Peer answering tasks from its own chain.
pub struct ServingPeer {
    host: String,
    chain: RwLock<TestChain>,
    hashes_per_reply: usize,
    outbox: mpsc::UnboundedSender<PeerMessage>,
    disconnected: Mutex<Option<String>>,
    mempool_requests: Mutex<usize>,
}

impl ServingPeer {
    pub fn new(
        host: &str,
        chain: TestChain,
        outbox: mpsc::UnboundedSender<PeerMessage>,
    ) -> Self {
        Self {
            host: host.to_string(),
            chain: RwLock::new(chain),
            hashes_per_reply: 8,
            outbox,
            disconnected: Mutex::new(None),
            mempool_requests: Mutex::new(0),
        }
    }

    /// Mine more blocks on the served chain. Returns the new tip hash.
    pub fn mine_blocks(&self, count: u32) -> Hash {
        let mut chain = self.chain.write();
        chain.extend(count);
        chain.tip().hash()
    }

    pub fn disconnect_reason(&self) -> Option<String> {
        self.disconnected.lock().clone()
    }

    pub fn mempool_requests(&self) -> usize {
        *self.mempool_requests.lock()
    }

    fn answer(&self, task: PeerTask) -> CompletedTask {
        let chain = self.chain.read();
        let index: HashMap<Hash, usize> = chain
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.hash(), i))
            .collect();

        match task {
            PeerTask::GetBlockHashes { locator } => {
                let start = locator
                    .iter()
                    .find_map(|h| index.get(h))
                    .map_or(1, |i| i + 1);
                let hashes = chain
                    .blocks
                    .iter()
                    .skip(start)
                    .take(self.hashes_per_reply)
                    .map(Block::hash)
                    .collect();
                CompletedTask::BlockHashes(hashes)
            }
            PeerTask::GetMerkleBlocks { hashes } => {
                let blocks = hashes
                    .iter()
                    .filter_map(|h| index.get(h))
                    .map(|i| chain.filtered[*i].clone())
                    .collect();
                CompletedTask::MerkleBlocks(blocks)
            }
        }
    }

    fn post(&self, message: PeerMessage) {
        if self.outbox.send(message).is_err() {
            debug!(peer = %self.host, "Message pump gone");
        }
    }
}

#[async_trait]
impl SyncPeer for ServingPeer {
    fn host(&self) -> &str {
        &self.host
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn start_height(&self) -> u32 {
        self.chain.read().height()
    }

    async fn add_task(&self, task: PeerTask) {
        trace!(peer = %self.host, task = task.kind(), "Serving task");
        let answer = self.answer(task);
        self.post(PeerMessage::Completed {
            host: self.host.clone(),
            task: answer,
        });
    }

    async fn send_ping(&self, nonce: u64) {
        trace!(peer = %self.host, nonce, "Ping");
    }

    async fn request_mempool(&self) {
        *self.mempool_requests.lock() += 1;
    }

    async fn disconnect(&self, reason: &str) {
        *self.disconnected.lock() = Some(reason.to_string());
        self.post(PeerMessage::Disconnected {
            host: self.host.clone(),
        });
    }
}

/// Forward peer messages to the actor in arrival order.
pub fn spawn_pump(
    handle: SyncHandle<ServingPeer>,
    mut inbox: mpsc::UnboundedReceiver<PeerMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            let sent = match message {
                PeerMessage::Completed { host, task } => handle.task_completed(host, task).await,
                PeerMessage::Disconnected { host } => handle.peer_disconnected(host).await,
            };
            if sent.is_err() {
                break;
            }
        }
    })
}
