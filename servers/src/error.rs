//! Runtime error taxonomy for orchestration, in the same `thiserror` style
//! `rblocksim_chain::error` uses. Most invalid states the reference
//! implementation treats as fatal (`abort()`, out-of-bounds node lookups)
//! are instead invariant panics via `rblocksim_core::fatal`; this enum is
//! reserved for the handful of conditions a caller can reasonably check
//! before they'd otherwise panic.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Mirrors `initAttackers`'s `attackers_count >= conf.lps` fatal check:
    /// an attack needs at least one honest node to attack.
    #[error("an attack needs at least 2 nodes to elect 1 attacker distinct from the rest, got {node_count}")]
    NotEnoughNodesForAttacker { node_count: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
