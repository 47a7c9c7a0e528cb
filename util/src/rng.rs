//! Random draws used by the mining scheduler and the network layer.
//!
//! Each simulated node owns one `Rng`, seeded deterministically from the
//! run's master seed and the node's id, so a run is fully reproducible and
//! a single node's draws never depend on what any other node does.

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};

pub struct Rng {
    inner: StdRng,
}

impl Rng {
    pub fn seeded(master_seed: u64, node_index: u32) -> Self {
        Rng {
            inner: StdRng::seed_from_u64(master_seed.wrapping_add(node_index as u64)),
        }
    }

    /// Draws from an exponential distribution with the given mean, the way
    /// `Expent` does in the reference implementation (mean, not rate).
    pub fn exponential(&mut self, mean: f64) -> f64 {
        let rate = 1.0 / mean;
        Exp::new(rate)
            .expect("exponential mean must be positive")
            .sample(&mut self.inner)
    }

    /// Draws from `Normal(mean, std_dev)`, mirroring `NormalExpanded`.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        Normal::new(mean, std_dev)
            .expect("std_dev must be finite and non-negative")
            .sample(&mut self.inner)
    }

    /// Draws a normal value, resampling until it clears `floor`. Used for
    /// hashpower shares, which must never be zero or negative.
    pub fn normal_clipped(&mut self, mean: f64, std_dev: f64, floor: f64) -> f64 {
        loop {
            let v = self.normal(mean, std_dev);
            if v >= floor {
                return v;
            }
        }
    }

    /// Inclusive uniform integer range, matching `RandomRange(rng, lo, hi)`.
    pub fn range_inclusive(&mut self, low: i64, high: i64) -> i64 {
        self.inner.gen_range(low..=high)
    }

    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p)
    }
}
