//! Assignment of mining power shares to nodes.

use rblocksim_core::consensus::{HASHPOWER_FLOOR, HASHPOWER_MEAN, HASHPOWER_STDDEV};
use rblocksim_core::global;
use rblocksim_util::Rng;

/// Draws an honest node's raw hashpower from a clipped normal distribution
/// and adds it to the process-wide total. Must be called for every honest
/// node before any node calls `honest_share`.
pub fn draw_and_register_honest_hashpower(rng: &mut Rng) -> f64 {
    let raw = rng.normal_clipped(HASHPOWER_MEAN, HASHPOWER_STDDEV, HASHPOWER_FLOOR);
    global::add_honest_hashpower(raw);
    raw
}

/// An honest node's share of the network's honest hashpower, scaled down to
/// make room for `attacker_share` if an attack is configured (so the shares
/// of every node, honest and attacker together, sum to 1).
pub fn honest_share(raw_hashpower: f64, attacker_share: f64) -> f64 {
    let portion = raw_hashpower / global::total_honest_hashpower();
    portion * (1.0 - attacker_share)
}
