//! Generation of the shared transaction universe at startup.

use rblocksim_core::{NodeId, Transaction, TxId};
use rblocksim_util::Rng;

/// Builds the fixed-size transaction universe used for the whole run.
///
/// Timestamps are evenly spaced across `termination_time` (so transaction
/// `i` arrives at `i * termination_time / txn_count`), and each
/// transaction's sender is picked uniformly at random from the node
/// population. Size and fee default to the transaction's own index, as in
/// the reference generator.
pub fn generate_transactions(
    rng: &mut Rng,
    node_count: u32,
    txn_count: u32,
    termination_time: f64,
) -> Vec<Transaction> {
    let increment = termination_time / txn_count as f64;
    (0..txn_count)
        .map(|i| Transaction {
            id: TxId(i),
            timestamp: i as f64 * increment,
            sender: NodeId(rng.range_inclusive(0, node_count as i64 - 1) as u32),
            size: i,
            fee: i as u64,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn timestamps_are_monotonic_and_bounded() {
        let mut rng = Rng::seeded(1, 0);
        let universe = generate_transactions(&mut rng, 100, 1000, 86_400.0);
        assert_eq!(universe.len(), 1000);
        for w in universe.windows(2) {
            assert!(w[0].timestamp <= w[1].timestamp);
        }
        assert!(universe.last().unwrap().timestamp < 86_400.0);
        assert!(universe.iter().all(|t| (t.sender.0 as u32) < 100));
    }
}
