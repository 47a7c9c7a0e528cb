//! Wires the world, the sequential kernel, and every node's state into one
//! runnable simulation.

use std::sync::Arc;

use log::info;

use rblocksim_core::NodeId;
use rblocksim_ledger::generate_transactions;
use rblocksim_p2p::{generate_peer_lists, Regions};
use rblocksim_util::Rng;

use crate::attacker::{AttackConfig, AttackKind};
use crate::error::{Error, Result};
use crate::kernel::{Event, Kernel, SequentialKernel};
use crate::node::{self, FiniReport, NodeState};
use crate::stats::StatsMode;
use crate::world::World;

pub struct RunConfig {
    pub node_count: u32,
    pub termination_time: f64,
    pub txn_count: u32,
    pub rng_seed: u64,
    pub block_interval: f64,
    pub gossip_fanout: usize,
    pub attack: AttackConfig,
    pub stats_mode: StatsMode,
}

pub struct RunOutcome {
    pub reports: Vec<FiniReport>,
    pub attacker: Option<NodeId>,
}

/// Elects the attacker, builds the shared world, and drives every node's
/// event loop to completion.
///
/// Uses dedicated RNG streams seeded off indices `node_count`, `node_count
/// + 1`, and `node_count + 2` for attacker election, peer-list generation
/// and the transaction universe respectively — deliberately out of the
/// `0..node_count` range any real node's `Rng::seeded` draws from, so none
/// of these one-off draws at setup time can collide with (or be perturbed
/// by the presence or absence of) any node's own stream. The reference
/// implementation draws its one attacker-election value from a separate,
/// unseeded `rng` parameter passed into `initAttackers`; giving it its own
/// deterministic stream here keeps the whole run reproducible instead.
pub fn run(config: RunConfig) -> Result<RunOutcome> {
    if !matches!(config.attack, AttackConfig::None) && config.node_count < 2 {
        return Err(Error::NotEnoughNodesForAttacker { node_count: config.node_count });
    }

    let mut election_rng = Rng::seeded(config.rng_seed, config.node_count);
    let attacker = match config.attack.kind() {
        AttackKind::None => None,
        _ => Some(NodeId(election_rng.range_inclusive(0, config.node_count as i64 - 1) as u32)),
    };

    let mut topology_rng = Rng::seeded(config.rng_seed, config.node_count + 1);
    let regions = Regions::new(config.node_count);
    let peers = generate_peer_lists(config.node_count, &mut topology_rng);

    let mut universe_rng = Rng::seeded(config.rng_seed, config.node_count + 2);
    let universe: Arc<[_]> =
        generate_transactions(&mut universe_rng, config.node_count, config.txn_count, config.termination_time).into();

    let world = World {
        node_count: config.node_count,
        termination_time: config.termination_time,
        txn_count: config.txn_count,
        rng_seed: config.rng_seed,
        block_interval: config.block_interval,
        universe,
        regions,
        peers,
        gossip_fanout: config.gossip_fanout,
        attack: config.attack,
        attacker,
        stats_mode: config.stats_mode,
    };

    let mut kernel = SequentialKernel::new(world.node_count);
    let mut states: Vec<NodeState> = (0..world.node_count).map(|i| NodeState::new(NodeId(i), &world)).collect();

    for i in 0..world.node_count {
        kernel.schedule(NodeId(i), 0.0, Event::Init);
    }

    while let Some(delivery) = kernel.pop() {
        if delivery.time > world.termination_time {
            // The heap delivers in nondecreasing time order, so every
            // remaining event is also past the horizon.
            break;
        }
        let state = &mut states[delivery.node.index()];
        node::dispatch(state, &world, &mut kernel, delivery.time, delivery.event);
    }

    info!("simulation reached termination time {}", world.termination_time);

    let reports: Vec<FiniReport> = states.iter().map(node::finalize).collect();
    let total_mined: u64 = reports.iter().map(|r| r.mined_by_me).sum();
    info!("total blocks mined across all nodes: {total_mined}");

    Ok(RunOutcome { reports, attacker: world.attacker })
}
