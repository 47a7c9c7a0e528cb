use croaring::Bitmap;
use rblocksim_core::{Block, NodeId, TransactionData, TxId};

#[test]
fn genesis_block_has_sentinel_parent() {
    let genesis = Block::genesis();
    assert_eq!(genesis.height, 0);
    assert_eq!(genesis.prev_block_miner, rblocksim_core::ids::GENESIS_MINER);
}

#[test]
fn sliding_window_tracks_only_in_range_ids() {
    let mut data = TransactionData {
        low: 100,
        high: 110,
        included: Bitmap::new(),
    };
    for id in 100..110 {
        assert!(!data.is_included(TxId(id)));
    }
    data.mark_included(TxId(105));
    assert!(data.is_included(TxId(105)));
    assert!(!data.is_included(TxId(106)));
    assert!(!data.in_window(TxId(110)));
    assert_eq!(NodeId(105).index(), 105);
}
