//! Per-node statistics collection, one of four mutually exclusive modes a
//! run can be configured with. Mirrors `Statistics.h`'s `StatsType` tagged
//! union, but as a proper Rust enum: a call against the wrong variant is a
//! silent no-op rather than the reference implementation's
//! assert-and-`exit(1)`, since the type itself already makes most such
//! mismatches unreachable.

use serde::Serialize;

use rblocksim_core::NodeId;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum StatsMode {
    #[default]
    None,
    Detailed,
    FiftyOne,
    Selfish,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStat {
    pub miner: NodeId,
    pub height: u64,
    pub received_time: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinedBlockStat {
    pub miner: NodeId,
    pub height: u64,
    pub mined_time: f64,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStats {
    pub block_stats: Vec<BlockStat>,
    pub mined_block_stats: Vec<MinedBlockStat>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiftyOneStats {
    pub attacker_blocks_in_main_chain: u64,
    pub total_blocks_in_main_chain: u64,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfishStats {
    pub attacker_blocks_in_main_chain: u64,
    pub total_blocks_in_main_chain: u64,
    pub total_blocks_mined: u64,
    pub own_blocks_in_main_chain: u64,
    pub switches_to_selfish_chain: u64,
}

/// A node's statistics state, tagged by which mode the run was configured
/// with. `None` carries nothing, matching a run with no `--stats` mode
/// selected.
#[derive(Clone, Debug)]
pub enum NodeStats {
    None,
    Detailed(DetailedStats),
    FiftyOne(FiftyOneStats),
    Selfish(SelfishStats),
}

impl NodeStats {
    pub fn new(mode: StatsMode) -> Self {
        match mode {
            StatsMode::None => NodeStats::None,
            StatsMode::Detailed => NodeStats::Detailed(DetailedStats::default()),
            StatsMode::FiftyOne => NodeStats::FiftyOne(FiftyOneStats::default()),
            StatsMode::Selfish => NodeStats::Selfish(SelfishStats::default()),
        }
    }

    pub fn receive_block_detailed(&mut self, miner: NodeId, height: u64, received_time: f64) {
        if let NodeStats::Detailed(s) = self {
            s.block_stats.push(BlockStat { miner, height, received_time });
        }
    }

    pub fn mine_block_detailed(&mut self, miner: NodeId, height: u64, mined_time: f64) {
        if let NodeStats::Detailed(s) = self {
            s.mined_block_stats.push(MinedBlockStat { miner, height, mined_time });
        }
    }

    pub fn mine_block_selfish(&mut self) {
        if let NodeStats::Selfish(s) = self {
            s.total_blocks_mined += 1;
        }
    }

    pub fn switch_to_selfish_chain(&mut self) {
        if let NodeStats::Selfish(s) = self {
            s.switches_to_selfish_chain += 1;
        }
    }

    /// `statsAddBlockFiftyOne`/`statsAddBlockSelfish`: called once per node
    /// newly applied to the main chain during a reorg (or a simple
    /// extension, which is a one-node reorg).
    pub fn add_block_in_main_chain(&mut self, miner: NodeId, me: NodeId, attacker: Option<NodeId>) {
        match self {
            NodeStats::FiftyOne(s) => {
                s.total_blocks_in_main_chain += 1;
                if Some(miner) == attacker {
                    s.attacker_blocks_in_main_chain += 1;
                }
            }
            NodeStats::Selfish(s) => {
                s.total_blocks_in_main_chain += 1;
                if Some(miner) == attacker {
                    s.attacker_blocks_in_main_chain += 1;
                }
                if miner == me {
                    s.own_blocks_in_main_chain += 1;
                }
            }
            _ => {}
        }
    }

    /// `statsRemoveBlockFiftyOne`/`statsRemoveBlockSelfish`: the inverse,
    /// called once per node reverted off the main chain.
    pub fn remove_block_in_main_chain(&mut self, miner: NodeId, me: NodeId, attacker: Option<NodeId>) {
        match self {
            NodeStats::FiftyOne(s) => {
                s.total_blocks_in_main_chain -= 1;
                if Some(miner) == attacker {
                    s.attacker_blocks_in_main_chain -= 1;
                }
            }
            NodeStats::Selfish(s) => {
                s.total_blocks_in_main_chain -= 1;
                if Some(miner) == attacker {
                    s.attacker_blocks_in_main_chain -= 1;
                }
                if miner == me {
                    s.own_blocks_in_main_chain -= 1;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mismatched_mode_calls_are_no_ops() {
        let mut stats = NodeStats::new(StatsMode::FiftyOne);
        stats.mine_block_selfish();
        stats.mine_block_detailed(NodeId(0), 1, 1.0);
        match stats {
            NodeStats::FiftyOne(s) => {
                assert_eq!(s.total_blocks_in_main_chain, 0);
            }
            _ => panic!("expected FiftyOne variant"),
        }
    }

    #[test]
    fn selfish_tracks_own_and_attacker_blocks_separately() {
        let mut stats = NodeStats::new(StatsMode::Selfish);
        let me = NodeId(1);
        let attacker = NodeId(2);
        stats.add_block_in_main_chain(me, me, Some(attacker));
        stats.add_block_in_main_chain(attacker, me, Some(attacker));
        stats.add_block_in_main_chain(NodeId(9), me, Some(attacker));
        match &stats {
            NodeStats::Selfish(s) => {
                assert_eq!(s.total_blocks_in_main_chain, 3);
                assert_eq!(s.attacker_blocks_in_main_chain, 1);
                assert_eq!(s.own_blocks_in_main_chain, 1);
            }
            _ => panic!("expected Selfish variant"),
        }
        stats.remove_block_in_main_chain(attacker, me, Some(attacker));
        match &stats {
            NodeStats::Selfish(s) => {
                assert_eq!(s.total_blocks_in_main_chain, 2);
                assert_eq!(s.attacker_blocks_in_main_chain, 0);
            }
            _ => panic!("expected Selfish variant"),
        }
    }
}
