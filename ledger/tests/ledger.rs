use rblocksim_core::NodeId;
use rblocksim_ledger::{generate_transactions, TransactionState};
use rblocksim_util::Rng;

#[test]
fn apply_then_revert_restores_state() {
    let mut rng = Rng::seeded(99, 0);
    let universe = generate_transactions(&mut rng, 10, 50, 1000.0);

    let mut state = TransactionState::new();
    let me = NodeId(0);
    let data = state
        .generate_transaction_data(500.0, me, &universe, 50, |_, _| 0.05)
        .expect("some transactions should be eligible by t=500");

    let confirmed_before: Vec<bool> = (0..50).map(|i| state.is_confirmed(rblocksim_core::TxId(i))).collect();

    state.apply_block_transactions(&data);
    let any_confirmed = (0..50).any(|i| state.is_confirmed(rblocksim_core::TxId(i)));
    assert!(any_confirmed);

    state.revert_applied_block_transactions(&data);
    let confirmed_after: Vec<bool> = (0..50).map(|i| state.is_confirmed(rblocksim_core::TxId(i))).collect();
    assert_eq!(confirmed_before, confirmed_after);
}

#[test]
fn delivery_window_only_advances() {
    let mut rng = Rng::seeded(7, 0);
    let universe = generate_transactions(&mut rng, 5, 20, 200.0);
    let mut state = TransactionState::new();

    state.deliver_new_transactions(50.0, &universe, 20);
    let high_at_50 = state.high;
    state.deliver_new_transactions(20.0, &universe, 20);
    assert!(state.high >= high_at_50 || state.high == high_at_50);
    state.deliver_new_transactions(150.0, &universe, 20);
    assert!(state.high >= high_at_50);
}
