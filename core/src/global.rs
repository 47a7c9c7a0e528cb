//! Process-wide mutable state.
//!
//! Grin keeps global tunables (e.g. `MINING_PARAMETER_MODE` in
//! `grin_core::global`) behind a `lazy_static! { ... RwLock<...> }`. The only
//! piece of state this simulator needs to share across node initialization
//! is a running total of honest hashpower, accumulated once per node during
//! `LP_INIT` and read once by every node after the `RBLOCKSIM_INIT` barrier;
//! a plain atomic is enough and avoids a lock for what is otherwise a
//! write-many-read-many-after-a-barrier counter. `f64` has no atomic type in
//! `std`, so the running total is stored as its bit pattern in an `AtomicU64`.

use std::sync::atomic::{AtomicU64, Ordering};

static TOTAL_HONEST_HASHPOWER_BITS: AtomicU64 = AtomicU64::new(0);

/// Adds `share` to the running total of honest hashpower. Called once per
/// honest node during initialization, before the barrier that starts the
/// simulation proper.
pub fn add_honest_hashpower(share: f64) {
    let mut current = TOTAL_HONEST_HASHPOWER_BITS.load(Ordering::Relaxed);
    loop {
        let updated = (f64::from_bits(current) + share).to_bits();
        match TOTAL_HONEST_HASHPOWER_BITS.compare_exchange_weak(
            current,
            updated,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return,
            Err(observed) => current = observed,
        }
    }
}

/// Reads the running total of honest hashpower. Only meaningful after every
/// honest node has finished `LP_INIT` and the barrier has been crossed.
pub fn total_honest_hashpower() -> f64 {
    f64::from_bits(TOTAL_HONEST_HASHPOWER_BITS.load(Ordering::Relaxed))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accumulates_across_calls() {
        let before = total_honest_hashpower();
        add_honest_hashpower(100.0);
        add_honest_hashpower(250.5);
        assert!((total_honest_hashpower() - before - 350.5).abs() < 1e-9);
    }
}
