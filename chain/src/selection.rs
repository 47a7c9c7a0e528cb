//! Chain selection: which of two competing chain tips is preferred.

use crate::store::Blockchain;
use crate::types::{ChainNode, NodeRef};

/// Strategy for picking the preferred tip between two competing chains.
/// Honest nodes and attacker nodes apply different rules, so `add_block`
/// and `maybe_switch_chains` take one of these rather than hardcoding a
/// single comparison.
pub trait ChainSelector {
    fn best(&self, chain: &Blockchain, a: NodeRef, b: NodeRef) -> NodeRef;
}

/// Highest score wins; ties broken by ancestors personally mined, then by
/// earlier timestamp, then by lower miner id (an arbitrary but
/// deterministic tiebreak, so every honest node converges on the same
/// chain given the same inputs).
#[derive(Default)]
pub struct HonestSelector;

impl HonestSelector {
    pub fn compare(a: &ChainNode, b: &ChainNode) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        a.score
            .cmp(&b.score)
            .then(a.ancestors_mined.cmp(&b.ancestors_mined))
            .then(b.timestamp.partial_cmp(&a.timestamp).unwrap_or(Ordering::Equal))
            .then(b.miner.cmp(&a.miner))
    }
}

impl ChainSelector for HonestSelector {
    fn best(&self, chain: &Blockchain, a: NodeRef, b: NodeRef) -> NodeRef {
        let node_a = chain.node(a);
        let node_b = chain.node(b);
        match HonestSelector::compare(node_a, node_b) {
            std::cmp::Ordering::Less => b,
            _ => a,
        }
    }
}

/// An attacker's view of chain selection: a chain it has personally mined
/// more of is preferred up to `catchup_tolerance` blocks of score
/// disadvantage, modeling an attacker willing to keep building on its own
/// (possibly weaker) chain rather than immediately conceding to the public
/// one. Beyond that tolerance, falls back to the honest comparison.
pub struct AttackerSelector {
    pub catchup_tolerance: u64,
}

impl ChainSelector for AttackerSelector {
    fn best(&self, chain: &Blockchain, a: NodeRef, b: NodeRef) -> NodeRef {
        let node_a = chain.node(a);
        let node_b = chain.node(b);

        if node_a.ancestors_mined == node_b.ancestors_mined {
            return HonestSelector.best(chain, a, b);
        }

        let (leader, leader_ref, follower, follower_ref) = if node_a.ancestors_mined > node_b.ancestors_mined {
            (node_a, a, node_b, b)
        } else {
            (node_b, b, node_a, a)
        };

        if leader.score >= follower.score {
            return leader_ref;
        }

        let virtual_score = leader.score + self.catchup_tolerance;
        match virtual_score.cmp(&follower.score) {
            std::cmp::Ordering::Greater => leader_ref,
            std::cmp::Ordering::Less => follower_ref,
            std::cmp::Ordering::Equal => {
                if leader.timestamp < follower.timestamp {
                    leader_ref
                } else if leader.timestamp > follower.timestamp {
                    follower_ref
                } else if leader.miner <= follower.miner {
                    leader_ref
                } else {
                    follower_ref
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::Blockchain;
    use crate::types::ChainNode;
    use rblocksim_core::NodeId;

    fn node_with(score: u64, ancestors_mined: u64, timestamp: f64, miner: u32) -> ChainNode {
        let mut n = ChainNode::genesis();
        n.score = score;
        n.ancestors_mined = ancestors_mined;
        n.timestamp = timestamp;
        n.miner = NodeId(miner);
        n.height = 1;
        n
    }

    #[test]
    fn honest_prefers_higher_score() {
        let mut chain = Blockchain::new();
        let a = chain.push_test_node(1, node_with(5, 0, 1.0, 1));
        let b = chain.push_test_node(1, node_with(6, 0, 1.0, 2));
        assert_eq!(HonestSelector.best(&chain, a, b), b);
    }

    #[test]
    fn attacker_keeps_tolerance_margin() {
        let mut chain = Blockchain::new();
        let mine = chain.push_test_node(3, node_with(3, 3, 1.0, 9));
        let public = chain.push_test_node(3, node_with(4, 0, 1.0, 1));
        let selector = AttackerSelector { catchup_tolerance: 2 };
        // mine.score(3) + tolerance(2) = 5 > public.score(4): stick with own chain.
        assert_eq!(selector.best(&chain, mine, public), mine);
    }

    #[test]
    fn attacker_concedes_beyond_tolerance() {
        let mut chain = Blockchain::new();
        let mine = chain.push_test_node(3, node_with(1, 3, 1.0, 9));
        let public = chain.push_test_node(3, node_with(10, 0, 1.0, 1));
        let selector = AttackerSelector { catchup_tolerance: 1 };
        assert_eq!(selector.best(&chain, mine, public), public);
    }
}
