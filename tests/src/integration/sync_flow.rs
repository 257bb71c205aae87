//! # Sync Flow Integration
//!
//! Complete initial block downloads through the spawned sync actor, with
//! serving peers answering every task.

use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, Subscription, SyncEvent};
use shared_types::{Block, BlockStore, Hash, InMemoryBlockStore, InventoryItem};
use spv_01_header_validation::Network;
use spv_02_light_client_sync::{SyncConfig, SyncHandle, SyncService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::fixtures::{
    init_tracing, mainnet_chain, spawn_pump, wallet_chain, PeerMessage, ServingPeer, TestChain,
};

struct Node {
    handle: SyncHandle<ServingPeer>,
    store: Arc<InMemoryBlockStore>,
    bus: Arc<InMemoryEventBus>,
    outbox: mpsc::UnboundedSender<PeerMessage>,
}

impl Node {
    fn start(config: SyncConfig, genesis: Block) -> Self {
        init_tracing();
        let store = Arc::new(InMemoryBlockStore::with_blocks(vec![genesis]).unwrap());
        let bus = Arc::new(config.event_bus());
        let (handle, _task) = SyncService::spawn(config, store.clone(), bus.clone());
        let (outbox, inbox) = mpsc::unbounded_channel();
        spawn_pump(handle.clone(), inbox);
        Self {
            handle,
            store,
            bus,
            outbox,
        }
    }

    fn peer(&self, host: &str, chain: TestChain) -> Arc<ServingPeer> {
        Arc::new(ServingPeer::new(host, chain, self.outbox.clone()))
    }

    fn subscribe(&self, topic: EventTopic) -> Subscription {
        self.bus.subscribe(EventFilter::topics(vec![topic]))
    }

    fn tip_height(&self) -> u32 {
        self.store.last_block().map_or(0, |b| b.height())
    }
}

/// Wait for the next `SyncFinished`.
async fn finished(lifecycle: &mut Subscription) {
    timeout(Duration::from_secs(10), async {
        while let Some(event) = lifecycle.recv().await {
            if event == SyncEvent::SyncFinished {
                return;
            }
        }
        panic!("event bus closed");
    })
    .await
    .expect("sync did not finish");
}

fn matched_transactions(events: &[SyncEvent]) -> Vec<Hash> {
    events
        .iter()
        .filter_map(|e| match e {
            SyncEvent::BlockVerified(v) => Some(v.transactions.iter().map(|tx| tx.hash)),
            _ => None,
        })
        .flatten()
        .collect()
}

#[tokio::test]
async fn test_downloads_wallet_transactions() {
    let chain = wallet_chain(30);
    let node = Node::start(SyncConfig::for_testing(), chain.blocks[0].clone());
    let mut lifecycle = node.subscribe(EventTopic::Lifecycle);
    let mut blocks = node.subscribe(EventTopic::Blocks);

    let peer = node.peer("honest", chain.clone());
    node.handle.peer_connected(peer.clone()).await.unwrap();
    node.handle.start().await.unwrap();
    finished(&mut lifecycle).await;

    assert_eq!(node.tip_height(), 29);
    assert_eq!(node.store.last_block().unwrap(), *chain.tip());

    let verified = blocks.drain();
    assert_eq!(verified.len(), 29);
    assert_eq!(matched_transactions(&verified), chain.wallet_transactions());
    assert_eq!(chain.wallet_transactions().len(), 9);

    let status = node.handle.status().await.unwrap();
    assert_eq!(status.synced_peers, vec!["honest".to_string()]);
    assert_eq!(status.active_peer, None);
    assert_eq!(status.pending_blocks, 0);
    assert_eq!(peer.mempool_requests(), 1);
}

#[tokio::test]
async fn test_invalid_peer_dropped_and_sync_continues() {
    let honest_chain = wallet_chain(20);
    // Taller chain so it is elected first; block 6 breaks the bits rule.
    let bad_chain = honest_chain.fork_with_bits(5, 0x207ffffe, 20);
    assert!(bad_chain.height() > honest_chain.height());

    let node = Node::start(SyncConfig::for_testing(), honest_chain.blocks[0].clone());
    let mut lifecycle = node.subscribe(EventTopic::Lifecycle);
    let mut downloads = node.subscribe(EventTopic::Download);

    let bad = node.peer("bad", bad_chain);
    let honest = node.peer("honest", honest_chain.clone());
    node.handle.peer_connected(bad.clone()).await.unwrap();
    node.handle.peer_connected(honest.clone()).await.unwrap();
    node.handle.start().await.unwrap();
    finished(&mut lifecycle).await;

    assert_eq!(node.store.last_block().unwrap(), *honest_chain.tip());
    assert!(bad.disconnect_reason().unwrap().contains("Unexpected bits"));
    assert!(honest.disconnect_reason().is_none());

    let events = downloads.drain();
    assert_eq!(
        events.first(),
        Some(&SyncEvent::DownloadStarted {
            peer: "bad".to_string()
        })
    );
    assert!(events.iter().any(|e| matches!(
        e,
        SyncEvent::DownloadFailed { peer, .. } if peer == "bad"
    )));
    assert!(events.contains(&SyncEvent::DownloadCompleted {
        peer: "honest".to_string()
    }));

    let status = node.handle.status().await.unwrap();
    assert_eq!(status.connected_peers, vec!["honest".to_string()]);
}

#[tokio::test]
async fn test_mainnet_headers_end_to_end() {
    let chain = mainnet_chain();
    let config = SyncConfig {
        network: Network::BitcoinMainnet,
        ..SyncConfig::for_testing()
    };
    let node = Node::start(config, chain.blocks[0].clone());
    let mut lifecycle = node.subscribe(EventTopic::Lifecycle);
    let mut blocks = node.subscribe(EventTopic::Blocks);

    node.handle
        .peer_connected(node.peer("seed", chain.clone()))
        .await
        .unwrap();
    node.handle.start().await.unwrap();
    finished(&mut lifecycle).await;

    assert_eq!(node.tip_height(), 3);
    let coinbases: Vec<Hash> = blocks
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            SyncEvent::BlockVerified(v) => Some(v.matched),
            _ => None,
        })
        .flatten()
        .collect();
    let roots: Vec<Hash> = chain.blocks[1..]
        .iter()
        .map(|b| b.header().merkle_root)
        .collect();
    assert_eq!(coinbases, roots);
}

#[tokio::test]
async fn test_new_blocks_roll_back_synced_peer() {
    let chain = wallet_chain(12);
    let node = Node::start(SyncConfig::for_testing(), chain.blocks[0].clone());
    let mut lifecycle = node.subscribe(EventTopic::Lifecycle);
    let mut status_events = node.subscribe(EventTopic::PeerStatus);

    let peer = node.peer("miner", chain);
    node.handle.peer_connected(peer.clone()).await.unwrap();
    node.handle.start().await.unwrap();
    finished(&mut lifecycle).await;
    assert_eq!(node.tip_height(), 11);

    let new_tip = peer.mine_blocks(3);
    node.handle
        .inventory_received("miner", vec![InventoryItem::block(new_tip)])
        .await
        .unwrap();
    finished(&mut lifecycle).await;

    assert_eq!(node.tip_height(), 14);
    assert_eq!(node.store.last_block().unwrap().hash(), new_tip);
    assert_eq!(
        status_events.drain(),
        vec![
            SyncEvent::PeerSynced {
                peer: "miner".to_string()
            },
            SyncEvent::PeerNotSynced {
                peer: "miner".to_string()
            },
            SyncEvent::PeerSynced {
                peer: "miner".to_string()
            },
        ]
    );
    assert_eq!(peer.mempool_requests(), 2);
}

#[tokio::test]
async fn test_disconnect_of_last_peer_stops_sync() {
    let chain = wallet_chain(40);
    let node = Node::start(SyncConfig::for_testing(), chain.blocks[0].clone());
    let mut lifecycle = node.subscribe(EventTopic::Lifecycle);

    node.handle
        .peer_connected(node.peer("flaky", chain))
        .await
        .unwrap();
    node.handle.start().await.unwrap();
    node.handle.peer_disconnected("flaky").await.unwrap();

    let stopped = timeout(Duration::from_secs(5), async {
        loop {
            match lifecycle.recv().await {
                Some(SyncEvent::SyncStopped { reason }) => return reason,
                Some(_) => continue,
                None => panic!("event bus closed"),
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(stopped, "no peers left");

    let status = node.handle.status().await.unwrap();
    assert!(status.connected_peers.is_empty());
    assert!(status.synced_peers.is_empty());
    assert!(node.tip_height() < 39);
}
