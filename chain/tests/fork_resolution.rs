use rblocksim_chain::{Blockchain, HonestSelector};
use rblocksim_core::{Block, NodeId, TransactionData};
use rblocksim_ledger::TransactionState;

fn block(height: u64, miner: u32, prev_miner: u32, timestamp: f64) -> Block {
    Block {
        timestamp,
        size: 10,
        miner: NodeId(miner),
        prev_block_miner: NodeId(prev_miner),
        height,
        sender: NodeId(miner),
        is_attack_block: false,
        transaction_data: TransactionData::empty(),
    }
}

#[test]
fn linear_chain_extends_head() {
    let mut chain = Blockchain::new();
    let mut ledger = TransactionState::new();
    let selector = HonestSelector;

    let b1 = block(1, 1, u32::MAX, 1.0);
    let (_r1, _) = chain.add_block(1.0, NodeId(1), &mut ledger, &b1, &selector);
    assert_eq!(chain.height(), 1);

    let b2 = block(2, 2, 1, 2.0);
    let (_r2, _) = chain.add_block(2.0, NodeId(2), &mut ledger, &b2, &selector);
    assert_eq!(chain.height(), 2);
    assert_eq!(chain.main_chain_head().height, 2);
}

#[test]
fn orphan_is_linked_once_parent_arrives() {
    let mut chain = Blockchain::new();
    let mut ledger = TransactionState::new();
    let selector = HonestSelector;

    // Height-2 block arrives before its height-1 parent: orphaned.
    let b2 = block(2, 2, 1, 5.0);
    let (r2, _) = chain.add_block(5.0, NodeId(2), &mut ledger, &b2, &selector);
    assert_eq!(chain.height(), 0, "orphan must not move the main chain");
    assert!(chain.node(r2).is_orphan());

    // Parent arrives: orphan should link and the main chain should advance
    // to height 2 directly (the orphan is unorphaned and found to be best).
    let b1 = block(1, 1, u32::MAX, 4.0);
    chain.add_block(4.0, NodeId(1), &mut ledger, &b1, &selector);
    assert_eq!(chain.height(), 2);
    assert!(!chain.node(r2).is_orphan());
}

#[test]
fn competing_fork_only_wins_with_higher_score() {
    let mut chain = Blockchain::new();
    let mut ledger = TransactionState::new();
    let selector = HonestSelector;

    let b1 = block(1, 1, u32::MAX, 1.0);
    chain.add_block(1.0, NodeId(1), &mut ledger, &b1, &selector);
    let b2 = block(2, 2, 1, 2.0);
    chain.add_block(2.0, NodeId(2), &mut ledger, &b2, &selector);
    assert_eq!(chain.height(), 2);

    // A competing block at height 1, from a different miner: same score as
    // the existing height-1 block, so it must not displace the 2-deep main
    // chain built on top of the original.
    let rival1 = block(1, 9, u32::MAX, 1.5);
    chain.add_block(1.5, NodeId(9), &mut ledger, &rival1, &selector);
    assert_eq!(chain.height(), 2, "single competing block at equal depth should not win");

    // Now extend the rival fork two deep, surpassing the original.
    let rival2 = block(2, 10, 9, 2.5);
    chain.add_block(2.5, NodeId(10), &mut ledger, &rival2, &selector);
    let rival3 = block(3, 11, 10, 3.5);
    chain.add_block(3.5, NodeId(11), &mut ledger, &rival3, &selector);
    assert_eq!(chain.height(), 3);
    assert_eq!(chain.main_chain_head().height, 3);
}
