//! Timing of the next block a node will mine.

use rblocksim_core::consensus::BLOCK_INTERVAL_DEFAULT;
use rblocksim_util::Rng;

/// A node's mining configuration: its share of total hashpower (honest,
/// already scaled for any attacker, or the attacker's fixed share) and the
/// network-wide mean block interval.
#[derive(Clone, Copy, Debug)]
pub struct MiningState {
    pub hashpower_portion: f64,
    pub block_interval: f64,
}

impl MiningState {
    pub fn new(hashpower_portion: f64) -> Self {
        MiningState {
            hashpower_portion,
            block_interval: BLOCK_INTERVAL_DEFAULT,
        }
    }

    /// Draws the simulated time at which this node's next block would be
    /// generated if nothing preempts it, or `None` if the node has no
    /// mining power at all (a 51%-attack run with the attacker share at
    /// 0, for instance).
    pub fn next_generation_time(&self, now: f64, rng: &mut Rng) -> Option<f64> {
        if self.hashpower_portion <= 0.0 {
            return None;
        }
        let mean = self.block_interval / self.hashpower_portion;
        Some(now + rng.exponential(mean))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_hashpower_never_mines() {
        let state = MiningState::new(0.0);
        let mut rng = Rng::seeded(1, 0);
        assert!(state.next_generation_time(0.0, &mut rng).is_none());
    }

    #[test]
    fn higher_share_mines_sooner_on_average() {
        let mut rng = Rng::seeded(2, 0);
        let strong = MiningState::new(0.5);
        let weak = MiningState::new(0.01);

        let strong_avg: f64 = (0..500)
            .map(|_| strong.next_generation_time(0.0, &mut rng).unwrap())
            .sum::<f64>()
            / 500.0;
        let weak_avg: f64 = (0..500)
            .map(|_| weak.next_generation_time(0.0, &mut rng).unwrap())
            .sum::<f64>()
            / 500.0;

        assert!(strong_avg < weak_avg);
    }
}
