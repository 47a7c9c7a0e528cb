//! Command-line surface, matching `RBlockSim.c`'s `handle_options` plus the
//! ambient parameters (node count, termination time, transaction universe
//! size) any runnable instance needs but the attack/statistics flags alone
//! don't name.

use clap::{Parser, ValueEnum};

use rblocksim_core::consensus::{
    BLOCK_INTERVAL_DEFAULT, CATCHUP_TOLERANCE_DEFAULT, DEPTH_TO_KEEP, FIFTY_ONE_HASHPOWER_DEFAULT, NODE_COUNT_DEFAULT,
    RNG_SEED_DEFAULT, SELFISH_DEPTH_DEFAULT, SELFISH_HASHPOWER_DEFAULT, SELFISH_START_DEFAULT, TERMINATION_TIME_DEFAULT,
    TXN_COUNT_DEFAULT,
};
use rblocksim_servers::attacker::{AttackConfig, AttackKind};
use rblocksim_servers::stats::StatsMode;

use crate::error::CliError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AttackArg {
    #[value(name = "51")]
    FiftyOne,
    Selfish,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatsArg {
    None,
    Detailed,
    FiftyOne,
    Selfish,
}

/// Raw command-line arguments, validated and resolved into a
/// `ResolvedConfig` by `resolve`.
#[derive(Parser, Debug)]
#[command(name = "rblocksim", about = "Discrete-event simulator for proof-of-work consensus dynamics")]
pub struct Cli {
    /// Worker thread count. Accepted for compatibility with the reference
    /// CLI surface; this kernel is strictly sequential and only logs a
    /// notice if more than one is requested.
    #[arg(short = 'w', long = "threads", default_value_t = 1)]
    pub threads: u32,

    /// Mean seconds between blocks for a node with average hashpower.
    #[arg(short = 'i', long = "block-interval", default_value_t = BLOCK_INTERVAL_DEFAULT)]
    pub block_interval: f64,

    /// Which attack, if any, the elected attacker carries out.
    #[arg(short = 'a', long = "attack", value_enum)]
    pub attack: Option<AttackArg>,

    /// Attacker's fixed share of total hashpower, in [0.0, 1.0].
    #[arg(short = 'h', long = "hashpower")]
    pub hashpower: Option<f64>,

    /// Selfish-mining concealment depth. Only valid with `--attack selfish`.
    #[arg(short = 'd', long = "depth")]
    pub depth: Option<u64>,

    /// How many blocks of score disadvantage the attacker tolerates before
    /// conceding to the public chain.
    #[arg(short = 'c', long = "catchup-tolerance")]
    pub catchup_tolerance: Option<u64>,

    /// Simulated time before the attacker arms itself. Only valid with
    /// `--attack selfish`; ignored (with a warning) for the 51% attack.
    #[arg(short = 's', long = "start-time")]
    pub start_time: Option<f64>,

    /// Overrides the formulaic results file name with this one.
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    #[arg(short = 'r', long = "rng-seed", default_value_t = RNG_SEED_DEFAULT)]
    pub rng_seed: u64,

    /// Statistics mode to collect. Defaults to `selfish` if an attack was
    /// selected, `none` otherwise.
    #[arg(long = "stats", value_enum)]
    pub stats: Option<StatsArg>,

    #[arg(short = 'n', long = "nodes", default_value_t = NODE_COUNT_DEFAULT)]
    pub nodes: u32,

    #[arg(short = 't', long = "termination", default_value_t = TERMINATION_TIME_DEFAULT)]
    pub termination: f64,

    #[arg(short = 'x', long = "transactions", default_value_t = TXN_COUNT_DEFAULT)]
    pub transactions: u32,
}

/// A fully validated, defaulted configuration ready to hand to
/// `rblocksim_servers::run`.
pub struct ResolvedConfig {
    pub nodes: u32,
    pub termination_time: f64,
    pub transactions: u32,
    pub rng_seed: u64,
    pub block_interval: f64,
    pub attack: AttackConfig,
    pub stats_mode: StatsMode,
    pub output: Option<String>,
}

impl Cli {
    /// Validates and defaults the raw arguments, matching `handle_options`'s
    /// fatal-error conditions and the per-attack-type defaulting rules.
    pub fn resolve(&self) -> Result<ResolvedConfig, CliError> {
        if self.threads > 1 {
            log::info!("threads={} requested, but this sequential kernel runs on a single thread", self.threads);
        }

        if let Some(path) = &self.output {
            crate::output::validate_output_filename(path)?;
        }

        let attack = self.resolve_attack()?;

        let stats_mode = match self.stats {
            Some(StatsArg::None) => StatsMode::None,
            Some(StatsArg::Detailed) => StatsMode::Detailed,
            Some(StatsArg::FiftyOne) => StatsMode::FiftyOne,
            Some(StatsArg::Selfish) => StatsMode::Selfish,
            None => match attack.kind() {
                AttackKind::None => StatsMode::None,
                AttackKind::Selfish | AttackKind::FiftyOne => StatsMode::Selfish,
            },
        };

        Ok(ResolvedConfig {
            nodes: self.nodes,
            termination_time: self.termination,
            transactions: self.transactions,
            rng_seed: self.rng_seed,
            block_interval: self.block_interval,
            attack,
            stats_mode,
            output: self.output.clone(),
        })
    }

    fn resolve_attack(&self) -> Result<AttackConfig, CliError> {
        match self.attack {
            None => {
                if self.hashpower.is_some() || self.depth.is_some() || self.catchup_tolerance.is_some() || self.start_time.is_some() {
                    return Err(CliError::AttackOptionWithoutAttack);
                }
                Ok(AttackConfig::None)
            }
            Some(AttackArg::FiftyOne) => {
                if self.depth.is_some() {
                    return Err(CliError::DepthNotApplicableToFiftyOne);
                }
                if self.nodes < 2 {
                    return Err(CliError::NotEnoughNodesForAttack(self.nodes));
                }
                if self.start_time.is_some() {
                    log::warn!("--start-time was specified, but the 51% attack ignores it");
                }
                let hashpower_portion = validate_or_default_hashpower(self.hashpower, FIFTY_ONE_HASHPOWER_DEFAULT)?;
                let catchup_tolerance = validate_or_default_catchup(self.catchup_tolerance, CATCHUP_TOLERANCE_DEFAULT)?;
                Ok(AttackConfig::FiftyOne { hashpower_portion, catchup_tolerance })
            }
            Some(AttackArg::Selfish) => {
                if self.nodes < 2 {
                    return Err(CliError::NotEnoughNodesForAttack(self.nodes));
                }
                let hashpower_portion = validate_or_default_hashpower(self.hashpower, SELFISH_HASHPOWER_DEFAULT)?;
                let catchup_tolerance = validate_or_default_catchup(self.catchup_tolerance, CATCHUP_TOLERANCE_DEFAULT)?;
                let depth = self.depth.unwrap_or(SELFISH_DEPTH_DEFAULT);
                let start_time = match self.start_time {
                    Some(s) if s < 0.0 => return Err(CliError::InvalidStartTime(s)),
                    Some(s) => s,
                    None => SELFISH_START_DEFAULT,
                };
                Ok(AttackConfig::Selfish { hashpower_portion, depth, catchup_tolerance, start_time })
            }
        }
    }
}

fn validate_or_default_hashpower(given: Option<f64>, default: f64) -> Result<f64, CliError> {
    match given {
        Some(h) if !(0.0..=1.0).contains(&h) => Err(CliError::InvalidHashpower(h)),
        Some(h) => Ok(h),
        None => Ok(default),
    }
}

fn validate_or_default_catchup(given: Option<u64>, default: u64) -> Result<u64, CliError> {
    match given {
        Some(c) if c > DEPTH_TO_KEEP => Err(CliError::CatchupToleranceTooLarge { value: c, max: DEPTH_TO_KEEP }),
        Some(c) => Ok(c),
        None => Ok(default),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            threads: 1,
            block_interval: BLOCK_INTERVAL_DEFAULT,
            attack: None,
            hashpower: None,
            depth: None,
            catchup_tolerance: None,
            start_time: None,
            output: None,
            rng_seed: RNG_SEED_DEFAULT,
            stats: None,
            nodes: NODE_COUNT_DEFAULT,
            termination: TERMINATION_TIME_DEFAULT,
            transactions: TXN_COUNT_DEFAULT,
        }
    }

    #[test]
    fn no_attack_defaults_to_no_stats() {
        let resolved = base_cli().resolve().unwrap();
        assert!(matches!(resolved.attack, AttackConfig::None));
        assert!(matches!(resolved.stats_mode, StatsMode::None));
    }

    #[test]
    fn selfish_attack_defaults_stats_to_selfish() {
        let mut cli = base_cli();
        cli.attack = Some(AttackArg::Selfish);
        let resolved = cli.resolve().unwrap();
        assert!(matches!(resolved.stats_mode, StatsMode::Selfish));
        match resolved.attack {
            AttackConfig::Selfish { depth, catchup_tolerance, start_time, .. } => {
                assert_eq!(depth, SELFISH_DEPTH_DEFAULT);
                assert_eq!(catchup_tolerance, CATCHUP_TOLERANCE_DEFAULT);
                assert_eq!(start_time, SELFISH_START_DEFAULT);
            }
            _ => panic!("expected selfish attack"),
        }
    }

    #[test]
    fn depth_with_fifty_one_attack_is_rejected() {
        let mut cli = base_cli();
        cli.attack = Some(AttackArg::FiftyOne);
        cli.depth = Some(3);
        assert!(matches!(cli.resolve(), Err(CliError::DepthNotApplicableToFiftyOne)));
    }

    #[test]
    fn hashpower_without_attack_is_rejected() {
        let mut cli = base_cli();
        cli.hashpower = Some(0.4);
        assert!(matches!(cli.resolve(), Err(CliError::AttackOptionWithoutAttack)));
    }

    #[test]
    fn hashpower_out_of_range_is_rejected() {
        let mut cli = base_cli();
        cli.attack = Some(AttackArg::Selfish);
        cli.hashpower = Some(1.5);
        assert!(matches!(cli.resolve(), Err(CliError::InvalidHashpower(_))));
    }

    #[test]
    fn catchup_tolerance_above_depth_to_keep_is_rejected() {
        let mut cli = base_cli();
        cli.attack = Some(AttackArg::FiftyOne);
        cli.catchup_tolerance = Some(DEPTH_TO_KEEP + 1);
        assert!(matches!(cli.resolve(), Err(CliError::CatchupToleranceTooLarge { .. })));
    }

    #[test]
    fn negative_start_time_is_rejected() {
        let mut cli = base_cli();
        cli.attack = Some(AttackArg::Selfish);
        cli.start_time = Some(-1.0);
        assert!(matches!(cli.resolve(), Err(CliError::InvalidStartTime(_))));
    }

    #[test]
    fn attack_with_too_few_nodes_is_rejected() {
        let mut cli = base_cli();
        cli.attack = Some(AttackArg::Selfish);
        cli.nodes = 1;
        assert!(matches!(cli.resolve(), Err(CliError::NotEnoughNodesForAttack(1))));
    }

    #[test]
    fn output_path_without_json_extension_is_rejected() {
        let mut cli = base_cli();
        cli.output = Some("stats.txt".to_string());
        assert!(matches!(cli.resolve(), Err(CliError::OutputMissingJsonExtension { .. })));
    }
}
