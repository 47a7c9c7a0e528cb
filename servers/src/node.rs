//! Per-node state and event handlers.
//!
//! These six handlers are a direct port of `RBlockSim.c`'s `ProcessEvent`
//! switch, including its precise rearm/no-rearm control flow: a handler
//! reschedules this node's next mining timer only where the reference
//! implementation's `case` falls through to the trailing
//! `scheduleNextBlockGeneration` call by `break`ing rather than `return`ing
//! early. See each handler's doc comment for which early-return paths skip
//! the reschedule.

use rblocksim_chain::{AttackerSelector, Blockchain, ChainSelector, HonestSelector, Reorg};
use rblocksim_core::consensus::ANCESTOR_PROPAGATION_DELTA;
use rblocksim_core::{Block, NodeId, TransactionData};
use rblocksim_ledger::TransactionState;
use rblocksim_p2p::{gossip_targets, transmission_delay};
use rblocksim_pow::MiningState;
use rblocksim_util::Rng;

use crate::attacker::{AttackConfig, AttackerState};
use crate::kernel::{Event, Kernel};
use crate::stats::{NodeStats, StatsMode};
use crate::world::World;

/// A node's chain-selection strategy: honest nodes and the elected attacker
/// use different rules (`rblocksim_chain::selection`), picked once at
/// construction based on whether the node is the attacker.
enum Selector {
    Honest(HonestSelector),
    Attacker(AttackerSelector),
}

impl ChainSelector for Selector {
    fn best(&self, chain: &Blockchain, a: rblocksim_chain::NodeRef, b: rblocksim_chain::NodeRef) -> rblocksim_chain::NodeRef {
        match self {
            Selector::Honest(s) => s.best(chain, a, b),
            Selector::Attacker(s) => s.best(chain, a, b),
        }
    }
}

pub struct NodeState {
    pub id: NodeId,
    rng: Rng,
    mining: MiningState,
    /// An honest node's raw (unscaled) hashpower draw, held between
    /// `Init` and `BarrierInit` until the total across every honest node
    /// is known and each node's share can be computed. Unused for the
    /// attacker, whose share is fixed by `AttackConfig` directly.
    raw_hashpower: f64,
    chain: Blockchain,
    ledger: TransactionState,
    mined_by_me: u64,
    pub attacker: Option<AttackerState>,
    stats: NodeStats,
    selector: Selector,
}

impl NodeState {
    pub fn new(id: NodeId, world: &World) -> Self {
        let is_attacker = world.attacker == Some(id);
        let selector = if is_attacker {
            Selector::Attacker(AttackerSelector { catchup_tolerance: world.attack.catchup_tolerance() })
        } else {
            Selector::Honest(HonestSelector)
        };
        NodeState {
            id,
            rng: Rng::seeded(world.rng_seed, id.0),
            mining: MiningState::new(0.0),
            raw_hashpower: 0.0,
            chain: Blockchain::new(),
            ledger: TransactionState::new(),
            mined_by_me: 0,
            attacker: if is_attacker { Some(AttackerState::default()) } else { None },
            stats: NodeStats::new(world.stats_mode),
            selector,
        }
    }
}

/// What a node reports once the run ends, for `rblocksim-config::output`
/// to write out.
pub struct AttackerFiniInfo {
    pub hashpower_portion: f64,
    pub failed_attacks: u64,
    pub successful_conceals: u64,
}

pub struct FiniReport {
    pub id: NodeId,
    pub mined_by_me: u64,
    pub height: u64,
    pub attacker: Option<AttackerFiniInfo>,
    pub stats: NodeStats,
}

/// Collects a node's final state. Corresponds to `LP_FINI` in the
/// reference event loop, which never reschedules anything (the simulation
/// is ending), so unlike the other handlers this takes no kernel.
pub fn finalize(state: &NodeState) -> FiniReport {
    FiniReport {
        id: state.id,
        mined_by_me: state.mined_by_me,
        height: state.chain.height(),
        attacker: state.attacker.as_ref().map(|a| AttackerFiniInfo {
            hashpower_portion: state.mining.hashpower_portion,
            failed_attacks: a.failed_attacks,
            successful_conceals: a.successful_conceals,
        }),
        stats: state.stats.clone(),
    }
}

/// Dispatches one kernel delivery to its handler. Events arriving after
/// `world.termination_time` are dropped by the driver before this is ever
/// called (see `rblocksim_servers::run`), mirroring `CanEnd`'s pure
/// time-boundary role in the original: the reference kernel never lets a
/// handler run past the end of the simulation either.
pub fn dispatch(state: &mut NodeState, world: &World, kernel: &mut dyn Kernel, now: f64, event: Event) {
    match event {
        Event::Init => handle_init(state, kernel, now),
        Event::BarrierInit => handle_barrier_init(state, world, kernel, now),
        Event::GenerateBlock { .. } => handle_generate_block(state, world, kernel, now),
        Event::ReceiveBlock { block } => handle_receive_block(state, world, kernel, now, block),
        Event::RequestBlock { requester, miner, height } => {
            handle_request_block(state, world, kernel, now, requester, miner, height)
        }
    }
}

/// `LP_INIT`: draws this node's raw hashpower if it isn't the attacker,
/// then self-schedules `RBLOCKSIM_INIT` at the same time. Never reschedules
/// mining directly — `BarrierInit` does that once every node's hashpower is
/// known.
fn handle_init(state: &mut NodeState, kernel: &mut dyn Kernel, now: f64) {
    if state.attacker.is_none() {
        state.raw_hashpower = rblocksim_pow::hashpower::draw_and_register_honest_hashpower(&mut state.rng);
    }
    kernel.schedule(state.id, now, Event::BarrierInit);
}

/// `RBLOCKSIM_INIT`: runs after every node's `LP_INIT` has had a chance to
/// register its hashpower, so the network-wide total is final. Computes
/// this node's share and arms its first mining timer. Always reschedules.
fn handle_barrier_init(state: &mut NodeState, world: &World, kernel: &mut dyn Kernel, now: f64) {
    let portion = match &state.attacker {
        Some(_) => world.attack.hashpower_portion(),
        None => rblocksim_pow::hashpower::honest_share(state.raw_hashpower, world.attack.hashpower_portion()),
    };
    state.mining = MiningState::new(portion);
    state.mining.block_interval = world.block_interval;
    reschedule_generation(state, kernel, now);
}

fn reschedule_generation(state: &mut NodeState, kernel: &mut dyn Kernel, now: f64) {
    if let Some(t) = state.mining.next_generation_time(now, &mut state.rng) {
        kernel.schedule_generate_block(state.id, t);
    }
}

/// `GENERATE_BLOCK`: mines a block on top of this node's own chain view,
/// then either propagates it immediately or feeds it into the selfish
/// mining state machine. Always reschedules, regardless of which branch
/// fires.
fn handle_generate_block(state: &mut NodeState, world: &World, kernel: &mut dyn Kernel, now: f64) {
    let txn_data = state.ledger.generate_transaction_data(now, state.id, &world.universe, world.txn_count, |sender, me| {
        transmission_delay(&world.regions, sender, me, None)
    });

    let head = state.chain.node(state.chain.main_chain_head()).clone();
    let mut block = Block {
        timestamp: now,
        size: 10,
        miner: state.id,
        prev_block_miner: head.miner,
        height: head.height + 1,
        sender: state.id,
        is_attack_block: false,
        transaction_data: txn_data.unwrap_or_else(TransactionData::empty),
    };

    state.mined_by_me += 1;
    let (_own_ref, reorg) = state.chain.add_block(now, state.id, &mut state.ledger, &block, &state.selector);
    apply_stats_reorg(state, world, &reorg);

    let selfish_attack_active = matches!(world.attack, AttackConfig::Selfish { .. })
        && state.attacker.is_some()
        && !state.attacker.as_ref().unwrap().finished_selfish_mining;

    if selfish_attack_active {
        run_selfish_mining_on_generate(state, world, kernel, now, &mut block);
    } else {
        propagate_block(state, world, kernel, now, &block);
    }

    match world.stats_mode {
        StatsMode::Detailed => state.stats.mine_block_detailed(state.id, block.height, now),
        StatsMode::Selfish => state.stats.mine_block_selfish(),
        _ => {}
    }

    reschedule_generation(state, kernel, now);
}

/// The selfish-mining state machine run once per freshly-mined block,
/// grounded on `RBlockSim.c`'s `GENERATE_BLOCK` case. A chain switch
/// noticed while concealing ends the attack attempt (incrementing
/// `failed_attacks`) before any entry/release check runs this round; entry
/// and release are then each evaluated, in that order, against the
/// (possibly just-reset) state.
fn run_selfish_mining_on_generate(state: &mut NodeState, world: &World, kernel: &mut dyn Kernel, now: f64, block: &mut Block) {
    let AttackConfig::Selfish { start_time, depth, .. } = world.attack else {
        rblocksim_core::fatal::invariant_violation("selfish mining handler invoked with a non-selfish attack config");
    };

    {
        let attacker = state.attacker.as_mut().expect("selfish_attack_active implies an attacker");
        if attacker.is_selfish_mining {
            if let Some(parent_ref) = state.chain.find_node(block.prev_block_miner, block.height - 1) {
                if state.chain.node(parent_ref).miner != state.id {
                    attacker.is_selfish_mining = false;
                    attacker.failed_attacks += 1;
                }
            }
        }
    }

    {
        let attacker = state.attacker.as_mut().unwrap();
        if now >= start_time && !attacker.is_selfish_mining {
            attacker.is_selfish_mining = true;
            attacker.last_propagated_height = block.height - 1;
        }
    }

    let should_release = {
        let attacker = state.attacker.as_ref().unwrap();
        attacker.is_selfish_mining && state.chain.height() - attacker.last_propagated_height >= depth
    };

    if should_release {
        let concealed_blocks = {
            let attacker = state.attacker.as_ref().unwrap();
            state.chain.height() - attacker.last_propagated_height
        };

        if let StatsMode::Selfish = world.stats_mode {
            state.stats.switch_to_selfish_chain();
        }

        block.is_attack_block = true;
        propagate_block_and_n_ancestors(state, world, kernel, now, block, concealed_blocks);

        let attacker = state.attacker.as_mut().unwrap();
        attacker.successful_conceals += 1;
        attacker.last_propagated_height = block.height;
        attacker.is_selfish_mining = false;
    }
}

/// `propagateBlock`: gossips to this node's own static peer list.
fn propagate_block(state: &mut NodeState, world: &World, kernel: &mut dyn Kernel, send_time: f64, block: &Block) {
    let sender = block.sender;
    let peers = &world.peers[sender.index()];
    let sender_is_origin = block.miner == sender;
    let targets = gossip_targets(sender_is_origin, peers, world.gossip_fanout, &mut state.rng);
    for target in targets {
        let delay = transmission_delay(&world.regions, sender, target, Some(&mut state.rng));
        kernel.schedule(target, send_time + delay, Event::ReceiveBlock { block: block.clone() });
    }
}

/// `propagateBlockAndNAncestors`: releases a concealed private chain. Sends
/// `n_ancestors - 1` ancestors (retrieved by `(miner, height)` from this
/// node's own chain view, each `ANCESTOR_PROPAGATION_DELTA` seconds apart),
/// followed by the tip itself — `n_ancestors` sends in total, matching the
/// reference implementation's loop plus its one trailing send outside it.
fn propagate_block_and_n_ancestors(
    state: &mut NodeState,
    world: &World,
    kernel: &mut dyn Kernel,
    mut send_time: f64,
    block: &Block,
    n_ancestors: u64,
) {
    for i in 1..n_ancestors {
        let height = block.height - n_ancestors + i;
        let ancestor_ref = state
            .chain
            .find_node(block.miner, height)
            .unwrap_or_else(|| rblocksim_core::fatal::invariant_violation("selfish burst ancestor missing from local chain"));
        let mut ancestor_block = state.chain.block_from_node(ancestor_ref);
        ancestor_block.sender = state.id;
        propagate_block(state, world, kernel, send_time, &ancestor_block);
        send_time += ANCESTOR_PROPAGATION_DELTA;
    }

    let mut tip = block.clone();
    tip.sender = state.id;
    propagate_block(state, world, kernel, send_time, &tip);
}

/// `RECEIVE_BLOCK`. Has three early-return paths in the reference
/// implementation that skip the reschedule entirely: a duplicate
/// non-orphan (no action at all), a duplicate orphan (re-requests its
/// parent), and a non-duplicate block that does not move the main chain
/// (propagated, but no reschedule). Only a non-duplicate block that does
/// move the main chain falls through to the reschedule at the end.
fn handle_receive_block(state: &mut NodeState, world: &World, kernel: &mut dyn Kernel, now: f64, mut block: Block) {
    if let Some(existing) = state.chain.find_node(block.miner, block.height) {
        if state.chain.node(existing).is_orphan() {
            request_parent(state, world, kernel, now, &block);
        }
        return;
    }

    let (valid, _elapsed) = block.validate();
    if !valid {
        return;
    }

    if let StatsMode::Detailed = world.stats_mode {
        state.stats.receive_block_detailed(block.miner, block.height, now);
    }

    let (own_ref, reorg) = state.chain.add_block(now, state.id, &mut state.ledger, &block, &state.selector);
    let updated_mainchain = !reorg.reverted.is_empty() || !reorg.applied.is_empty();
    apply_stats_reorg(state, world, &reorg);
    let found_parent = !state.chain.node(own_ref).is_orphan();

    if !found_parent {
        request_parent(state, world, kernel, now, &block);
    }

    let original_sender = block.sender;
    block.sender = state.id;
    propagate_block(state, world, kernel, now, &block);
    block.sender = original_sender;

    if !updated_mainchain {
        return;
    }

    if block.is_attack_block {
        if let StatsMode::Selfish = world.stats_mode {
            state.stats.switch_to_selfish_chain();
        }
    }

    if let Some(attacker) = state.attacker.as_mut() {
        attacker.last_propagated_height = block.height;
    }

    reschedule_generation(state, kernel, now);
}

/// `requestParent`: asks whoever sent us an orphan for its parent.
fn request_parent(state: &mut NodeState, world: &World, kernel: &mut dyn Kernel, request_time: f64, block: &Block) {
    let delay = transmission_delay(&world.regions, state.id, block.sender, Some(&mut state.rng));
    kernel.schedule(
        block.sender,
        request_time + delay,
        Event::RequestBlock { requester: state.id, miner: block.prev_block_miner, height: block.height - 1 },
    );
}

/// `REQUEST_BLOCK`: answers a parent request if this node has the block,
/// otherwise does nothing. Never reschedules, in either case.
fn handle_request_block(
    state: &mut NodeState,
    world: &World,
    kernel: &mut dyn Kernel,
    now: f64,
    requester: NodeId,
    miner: NodeId,
    height: u64,
) {
    let Some(node_ref) = state.chain.find_node(miner, height) else {
        return;
    };
    let mut block = state.chain.block_from_node(node_ref);
    block.sender = state.id;
    let delay = transmission_delay(&world.regions, state.id, requester, Some(&mut state.rng));
    kernel.schedule(requester, now + delay, Event::ReceiveBlock { block });
}

/// Walks a chain-store reorg and keeps this node's own statistics in step,
/// the way `applyChainNode`/`revertAppliedChainNode` update `StatsState`
/// inline during `switchChains`'s walk. `reorg.reverted` and
/// `reorg.applied` are already in the order those functions would be
/// called in.
fn apply_stats_reorg(state: &mut NodeState, world: &World, reorg: &Reorg) {
    for r in &reorg.reverted {
        let miner = state.chain.node(*r).miner;
        state.stats.remove_block_in_main_chain(miner, state.id, world.attacker);
    }
    for r in &reorg.applied {
        let miner = state.chain.node(*r).miner;
        state.stats.add_block_in_main_chain(miner, state.id, world.attacker);
    }
}
