//! Sliding-window recycle and reorg scenarios: appending past the
//! window depth, reorging across disjoint transaction sets, and the
//! `switchChains(head, 0)` no-op case.

use croaring::Bitmap;

use rblocksim_chain::{Blockchain, HonestSelector};
use rblocksim_core::consensus::DEPTH_TO_KEEP;
use rblocksim_core::{Block, NodeId, TransactionData, TxId};
use rblocksim_ledger::TransactionState;

fn block(height: u64, miner: u32, prev_miner: u32, timestamp: f64, data: TransactionData) -> Block {
    Block {
        timestamp,
        size: 10,
        miner: NodeId(miner),
        prev_block_miner: NodeId(prev_miner),
        height,
        sender: NodeId(miner),
        is_attack_block: false,
        transaction_data: data,
    }
}

fn empty_block(height: u64, miner: u32, prev_miner: u32, timestamp: f64) -> Block {
    block(height, miner, prev_miner, timestamp, TransactionData::empty())
}

#[test]
fn sliding_window_recycles_at_twice_depth_to_keep() {
    let mut chain = Blockchain::new();
    let mut ledger = TransactionState::new();
    let selector = HonestSelector;

    let target = 2 * DEPTH_TO_KEEP;
    let mut prev_miner = u32::MAX;
    for h in 1..=target {
        let miner = h as u32;
        let b = empty_block(h, miner, prev_miner, h as f64);
        chain.add_block(h as f64, NodeId(miner), &mut ledger, &b, &selector);
        prev_miner = miner;
    }

    assert_eq!(chain.height(), target);
    assert_eq!(chain.max_height(), target);
    assert_eq!(
        chain.min_height(),
        DEPTH_TO_KEEP,
        "inserting a block at 2*DEPTH_TO_KEEP must slide the window forward by DEPTH_TO_KEEP"
    );

    // Heights below the new min_height are no longer addressable.
    assert!(chain.find_node(NodeId(1), 1).is_none());
    // The head and its immediate neighborhood remain addressable.
    assert!(chain.find_node(NodeId(target as u32), target).is_some());
}

#[test]
fn switch_to_current_head_is_a_no_op() {
    let mut chain = Blockchain::new();
    let mut ledger = TransactionState::new();
    let selector = HonestSelector;

    let b1 = empty_block(1, 1, u32::MAX, 1.0);
    chain.add_block(1.0, NodeId(1), &mut ledger, &b1, &selector);
    let b2 = empty_block(2, 2, 1, 2.0);
    chain.add_block(2.0, NodeId(2), &mut ledger, &b2, &selector);

    let head_before = chain.main_chain_head();
    let height_before = chain.height();

    let reorg = chain.switch_chains(&mut ledger, head_before);

    assert!(reorg.reverted.is_empty());
    assert!(reorg.applied.is_empty());
    assert_eq!(chain.height(), height_before);
    assert_eq!(chain.main_chain_head(), head_before);
}

fn txn_data(low: u32, high: u32, ids: &[u32]) -> TransactionData {
    let mut included = Bitmap::new();
    for &id in ids {
        included.add(id - low);
    }
    TransactionData { low, high, included }
}

#[test]
fn reorg_across_disjoint_transaction_sets_restores_exact_bitmap_on_return() {
    let mut chain = Blockchain::new();
    let mut ledger = TransactionState::new();
    let selector = HonestSelector;

    // Fork point: genesis. Fork A carries transactions [0, 10), fork B
    // carries the disjoint range [100, 110).
    let fork_a = block(1, 1, u32::MAX, 1.0, txn_data(0, 10, &[0, 1, 2, 3, 4]));
    let (a_ref, _) = chain.add_block(1.0, NodeId(1), &mut ledger, &fork_a, &selector);
    assert_eq!(chain.main_chain_head(), a_ref);

    let snapshot_a: Vec<bool> = (0..10).map(|i| ledger.is_confirmed(TxId(i))).collect();
    assert!(snapshot_a.iter().any(|&b| b), "fork A's transactions should be confirmed");

    // A longer, disjoint fork B (score 2 beats score 1) carrying
    // transactions [100, 110).
    let fork_b1 = block(1, 9, u32::MAX, 0.5, txn_data(100, 110, &[100, 101, 102]));
    let (b1_ref, _) = chain.add_block(0.5, NodeId(9), &mut ledger, &fork_b1, &selector);
    let fork_b2 = empty_block(2, 10, 9, 1.5);
    let (_b2_ref, reorg_to_b) = chain.add_block(1.5, NodeId(10), &mut ledger, &fork_b2, &selector);
    assert!(!reorg_to_b.reverted.is_empty() || chain.main_chain_head().height == 2, "fork B should take over");

    // Fork B's transactions are now confirmed, fork A's are not.
    assert!((100..110).any(|i| ledger.is_confirmed(TxId(i))));

    // Switch back to fork A explicitly.
    chain.switch_chains(&mut ledger, a_ref);
    let snapshot_a_after_return: Vec<bool> = (0..10).map(|i| ledger.is_confirmed(TxId(i))).collect();
    assert_eq!(snapshot_a, snapshot_a_after_return, "returning to fork A must restore its exact bitmap snapshot");
    assert!((100..110).all(|i| !ledger.is_confirmed(TxId(i))), "fork B's transactions must be unconfirmed after leaving it");

    let _ = b1_ref;
}
