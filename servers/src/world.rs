//! Read-only context shared by every node: the transaction universe,
//! network topology, and the run's attack/statistics configuration.

use std::sync::Arc;

use rblocksim_core::{NodeId, Transaction};
use rblocksim_p2p::Regions;

use crate::attacker::AttackConfig;
use crate::stats::StatsMode;

pub struct World {
    pub node_count: u32,
    pub termination_time: f64,
    pub txn_count: u32,
    pub rng_seed: u64,
    pub block_interval: f64,
    pub universe: Arc<[Transaction]>,
    pub regions: Regions,
    pub peers: Vec<Vec<NodeId>>,
    pub gossip_fanout: usize,
    pub attack: AttackConfig,
    /// The single node elected to carry out `attack`, if any.
    pub attacker: Option<NodeId>,
    pub stats_mode: StatsMode,
}
