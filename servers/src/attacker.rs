//! Attack configuration and per-attacker mining state.

use rblocksim_core::consensus::{
    CATCHUP_TOLERANCE_DEFAULT, FIFTY_ONE_HASHPOWER_DEFAULT, SELFISH_DEPTH_DEFAULT, SELFISH_HASHPOWER_DEFAULT,
    SELFISH_START_DEFAULT,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AttackKind {
    None,
    Selfish,
    FiftyOne,
}

/// The attack a run is configured with, and the parameters it needs.
/// Exactly one node (if any) is elected to carry it out; see
/// `rblocksim_servers::run`'s attacker election, grounded on `Attacks.c`'s
/// `initAttackers`.
#[derive(Copy, Clone, Debug)]
pub enum AttackConfig {
    None,
    Selfish {
        hashpower_portion: f64,
        depth: u64,
        catchup_tolerance: u64,
        start_time: f64,
    },
    FiftyOne {
        hashpower_portion: f64,
        catchup_tolerance: u64,
    },
}

impl AttackConfig {
    pub fn kind(&self) -> AttackKind {
        match self {
            AttackConfig::None => AttackKind::None,
            AttackConfig::Selfish { .. } => AttackKind::Selfish,
            AttackConfig::FiftyOne { .. } => AttackKind::FiftyOne,
        }
    }

    /// The attacker's fixed share of total hashpower, or 0 if there is no
    /// attack (an attacker is never elected in that case, so this is never
    /// actually consulted for a real node).
    pub fn hashpower_portion(&self) -> f64 {
        match self {
            AttackConfig::None => 0.0,
            AttackConfig::Selfish { hashpower_portion, .. } => *hashpower_portion,
            AttackConfig::FiftyOne { hashpower_portion, .. } => *hashpower_portion,
        }
    }

    pub fn catchup_tolerance(&self) -> u64 {
        match self {
            AttackConfig::None => 0,
            AttackConfig::Selfish { catchup_tolerance, .. } => *catchup_tolerance,
            AttackConfig::FiftyOne { catchup_tolerance, .. } => *catchup_tolerance,
        }
    }

    pub fn selfish_defaults() -> Self {
        AttackConfig::Selfish {
            hashpower_portion: SELFISH_HASHPOWER_DEFAULT,
            depth: SELFISH_DEPTH_DEFAULT,
            catchup_tolerance: CATCHUP_TOLERANCE_DEFAULT,
            start_time: SELFISH_START_DEFAULT,
        }
    }

    pub fn fifty_one_defaults() -> Self {
        AttackConfig::FiftyOne {
            hashpower_portion: FIFTY_ONE_HASHPOWER_DEFAULT,
            catchup_tolerance: CATCHUP_TOLERANCE_DEFAULT,
        }
    }
}

/// An attacker node's running state, mirroring `struct AttackerState` in
/// the reference `Attacks.h`.
#[derive(Clone, Debug, Default)]
pub struct AttackerState {
    /// Height of the last block this attacker has propagated to the
    /// network, whether by its own burst-release or because its main
    /// chain advanced from a block it received.
    pub last_propagated_height: u64,
    pub is_selfish_mining: bool,
    /// Declared but never set `true` by the reference implementation
    /// (`finishedSelfishMining` has no writer anywhere in `Attacks.c`);
    /// kept here unused rather than dropped, the way `rblocksim_chain`
    /// keeps `NodeFlags::INCLUDED` as a reserved bit.
    pub finished_selfish_mining: bool,
    pub failed_attacks: u64,
    pub successful_conceals: u64,
}
