//! # Header Chain Integration
//!
//! Header acceptance over shared storage, with real Bitcoin headers and
//! mined regtest chains.

use shared_types::{hash_to_display_hex, BlockStore, InMemoryBlockStore};
use spv_01_header_validation::test_utils::{mine_child, mined_chain};
use spv_01_header_validation::{
    build_validator, BlockValidator, ChainWindow, HeaderAcceptor, Network, NetworkParams,
    ValidationError,
};
use std::sync::Arc;

use super::fixtures::{init_tracing, mainnet_chain};

fn acceptor_from(
    params: &NetworkParams,
    genesis: shared_types::Block,
) -> (HeaderAcceptor, Arc<InMemoryBlockStore>) {
    let store = Arc::new(InMemoryBlockStore::with_blocks(vec![genesis]).unwrap());
    (HeaderAcceptor::new(params, store.clone()), store)
}

#[test]
fn test_mainnet_headers_accepted() {
    init_tracing();
    let chain = mainnet_chain();
    let (acceptor, store) = acceptor_from(&NetworkParams::bitcoin_mainnet(), chain.blocks[0].clone());

    for block in &chain.blocks[1..] {
        let stored = acceptor.accept(block.header()).unwrap();
        assert_eq!(stored, *block);
    }
    assert_eq!(store.len(), 4);
    assert_eq!(
        hash_to_display_hex(&store.last_block().unwrap().hash()),
        "0000000082b5015589a3fdf2d4baff403e6f0be035a5d9742c1cae6295464449"
    );
}

#[test]
fn test_mainnet_tampered_nonce_rejected() {
    let chain = mainnet_chain();
    let (acceptor, store) = acceptor_from(&NetworkParams::bitcoin_mainnet(), chain.blocks[0].clone());

    let mut header = *chain.blocks[1].header();
    header.nonce = header.nonce.wrapping_add(1);
    let err = acceptor.accept(&header).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidProofOfWork { height: 1, .. }));
    assert!(err.is_consensus_violation());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_mainnet_headers_pass_every_preset() {
    // The first blocks predate every fork, so all presets agree.
    let chain = mainnet_chain();
    for network in [
        Network::BitcoinMainnet,
        Network::BitcoinCashMainnet,
    ] {
        let store = Arc::new(InMemoryBlockStore::with_blocks(chain.blocks.clone()).unwrap());
        let validator = build_validator(&network.params(), ChainWindow::new(store));
        for pair in chain.blocks.windows(2) {
            assert!(
                validator.validate(&pair[1], &pair[0]).is_ok(),
                "{network:?} rejected {}",
                pair[1]
            );
        }
    }
}

#[test]
fn test_regtest_chain_across_retargets() {
    let chain = mined_chain(35, 700);
    let (acceptor, store) = acceptor_from(&NetworkParams::for_testing(), chain[0].clone());
    for block in &chain[1..] {
        acceptor.accept(block.header()).unwrap();
    }
    assert_eq!(store.last_block().unwrap().height(), 34);
}

#[test]
fn test_fast_blocks_must_retarget() {
    // 100 second blocks: the period at height 10 hits the 4x clamp.
    let chain = mined_chain(11, 100);
    let (acceptor, store) = acceptor_from(&NetworkParams::for_testing(), chain[0].clone());
    for block in &chain[1..10] {
        acceptor.accept(block.header()).unwrap();
    }

    let err = acceptor.accept(chain[10].header()).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::NotDifficultyTransitionEqualBits { height: 10, .. }
    ));
    assert_eq!(store.len(), 10);
}

#[test]
fn test_forked_sibling_rejected() {
    let chain = mined_chain(4, 700);
    let (acceptor, _) = acceptor_from(&NetworkParams::for_testing(), chain[0].clone());
    for block in &chain[1..] {
        acceptor.accept(block.header()).unwrap();
    }

    let sibling = mine_child(&chain[2], 701, [0u8; 32]);
    let err = acceptor.accept(sibling.header()).unwrap_err();
    assert!(matches!(err, ValidationError::ForkedHeader { height: 3, tip_height: 3 }));
    assert!(err.is_recoverable());
}

#[test]
fn test_params_from_json() {
    let params = NetworkParams::bitcoin_cash_testnet();
    let json = serde_json::to_string(&params).unwrap();
    assert_eq!(NetworkParams::from_json(&json).unwrap(), params);
}

#[test]
fn test_genesis_wire_encoding() {
    let chain = mainnet_chain();
    let raw = chain.blocks[0].header().serialize();
    assert_eq!(
        hex::encode(raw),
        "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd\
         7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c"
    );
    assert_eq!(shared_types::BlockHeader::deserialize(&raw), *chain.blocks[0].header());
}
