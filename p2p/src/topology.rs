//! Region assignment, inter-region latency, and peer-list generation.

use rblocksim_core::consensus::{LATENCIES, PEER_COUNT_MAX, PEER_COUNT_MIN, REGIONS_DISTRIBUTION, REGIONS_NUM};
use rblocksim_core::NodeId;
use rblocksim_util::Rng;

/// Partitions `node_count` nodes into `REGIONS_NUM` contiguous bands sized
/// by `REGIONS_DISTRIBUTION`, with the last region absorbing the remainder.
pub struct Regions {
    boundaries: [u32; REGIONS_NUM],
}

impl Regions {
    pub fn new(node_count: u32) -> Self {
        let mut boundaries = [0u32; REGIONS_NUM];
        let mut total = 0u32;
        for (i, frac) in REGIONS_DISTRIBUTION.iter().enumerate() {
            let size = (node_count as f64 * frac) as u32;
            boundaries[i] = size;
            total += size;
        }
        boundaries[REGIONS_NUM - 1] = node_count.saturating_sub(total);
        Regions { boundaries }
    }

    /// Returns the region index a node belongs to.
    pub fn region_of(&self, node: NodeId) -> usize {
        let mut remaining = node.0;
        for (i, size) in self.boundaries.iter().enumerate() {
            if remaining < *size {
                return i;
            }
            remaining -= size;
        }
        REGIONS_NUM - 1
    }
}

/// Mean (or, given an `Rng`, exponentially-drawn) transmission delay between
/// two nodes, based only on which regions they belong to.
pub fn transmission_delay(regions: &Regions, src: NodeId, dst: NodeId, rng: Option<&mut Rng>) -> f64 {
    let mean = LATENCIES[regions.region_of(src)][regions.region_of(dst)];
    match rng {
        Some(rng) => rng.exponential(mean),
        None => mean,
    }
}

/// Assigns every node a peer list of `PEER_COUNT_MIN..=PEER_COUNT_MAX`
/// distinct other nodes, drawn from the full node population without
/// regard to region (gossip topology is not geography-aware; only latency
/// is).
pub fn generate_peer_lists(node_count: u32, rng: &mut Rng) -> Vec<Vec<NodeId>> {
    (0..node_count)
        .map(|me| generate_peer_list(NodeId(me), node_count, rng))
        .collect()
}

fn generate_peer_list(me: NodeId, node_count: u32, rng: &mut Rng) -> Vec<NodeId> {
    let max_possible = node_count.saturating_sub(1) as usize;
    let target = PEER_COUNT_MIN + (rng.range_inclusive(0, (PEER_COUNT_MAX - PEER_COUNT_MIN) as i64) as usize);
    let target = target.min(max_possible);

    let mut chosen = std::collections::HashSet::new();
    let mut peers = Vec::with_capacity(target);
    while peers.len() < target {
        let candidate = rng.range_inclusive(0, node_count as i64 - 1) as u32;
        if candidate == me.0 || !chosen.insert(candidate) {
            continue;
        }
        peers.push(NodeId(candidate));
    }
    peers
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn regions_partition_all_nodes() {
        let regions = Regions::new(1000);
        for n in 0..1000 {
            let r = regions.region_of(NodeId(n));
            assert!(r < REGIONS_NUM);
        }
    }

    #[test]
    fn peer_lists_are_distinct_and_self_excluding() {
        let mut rng = Rng::seeded(5, 0);
        let lists = generate_peer_lists(200, &mut rng);
        for (me, peers) in lists.iter().enumerate() {
            assert!(peers.len() >= PEER_COUNT_MIN.min(199));
            assert!(peers.len() <= PEER_COUNT_MAX);
            assert!(!peers.contains(&NodeId(me as u32)));
            let unique: std::collections::HashSet<_> = peers.iter().collect();
            assert_eq!(unique.len(), peers.len());
        }
    }
}
