//! Block propagation via gossip.

use rblocksim_core::NodeId;
use rblocksim_util::Rng;

/// Selects which of `peers` a gossiping node forwards a block to.
///
/// If `fanout` is zero, there are no more peers than `fanout`, or `sender`
/// is the block's original miner, the block is sent to every peer.
/// Otherwise `fanout` distinct peers are chosen by rejection sampling,
/// matching the reference implementation's `gossipBlock`.
pub fn gossip_targets(sender_is_origin: bool, peers: &[NodeId], fanout: usize, rng: &mut Rng) -> Vec<NodeId> {
    if fanout == 0 || peers.len() <= fanout || sender_is_origin {
        return peers.to_vec();
    }

    let mut selected_indices = std::collections::HashSet::new();
    let mut targets = Vec::with_capacity(fanout);
    while targets.len() < fanout {
        let idx = rng.range_inclusive(0, peers.len() as i64 - 1) as usize;
        if selected_indices.insert(idx) {
            targets.push(peers[idx]);
        }
    }
    targets
}

#[cfg(test)]
mod test {
    use super::*;

    fn peers(n: u32) -> Vec<NodeId> {
        (0..n).map(NodeId).collect()
    }

    #[test]
    fn zero_fanout_sends_to_all() {
        let mut rng = Rng::seeded(1, 0);
        let p = peers(50);
        assert_eq!(gossip_targets(false, &p, 0, &mut rng).len(), 50);
    }

    #[test]
    fn origin_miner_always_sends_to_all() {
        let mut rng = Rng::seeded(1, 0);
        let p = peers(50);
        assert_eq!(gossip_targets(true, &p, 8, &mut rng).len(), 50);
    }

    #[test]
    fn fanout_smaller_than_peers_selects_distinct_subset() {
        let mut rng = Rng::seeded(1, 0);
        let p = peers(50);
        let targets = gossip_targets(false, &p, 8, &mut rng);
        assert_eq!(targets.len(), 8);
        let unique: std::collections::HashSet<_> = targets.iter().collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn fanout_at_least_peer_count_sends_to_all() {
        let mut rng = Rng::seeded(1, 0);
        let p = peers(5);
        assert_eq!(gossip_targets(false, &p, 8, &mut rng).len(), 5);
    }
}
