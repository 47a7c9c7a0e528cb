//! The `rblocksim` binary: parses CLI flags, runs the simulation to
//! completion, and persists whatever statistics mode was configured.
//!
//! Mirrors `original_source/RBlockSim/src/RBlockSim.c`'s `main`: parse and
//! validate options, reserve the results directory up front (before the
//! simulation runs, so a bad output path fails fast), run, then dump.

use std::process::ExitCode;

use clap::Parser;
use log::info;

use rblocksim_config::cli::Cli;
use rblocksim_config::error::CliError;
use rblocksim_config::output;
use rblocksim_servers::run::{run, RunConfig};
use rblocksim_servers::stats::StatsMode;

fn main() -> ExitCode {
    rblocksim_util::logger::init_logger();

    let cli = Cli::parse();
    let resolved = match cli.resolve() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("rblocksim: invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    let run_config = RunConfig {
        node_count: resolved.nodes,
        termination_time: resolved.termination_time,
        txn_count: resolved.transactions,
        rng_seed: resolved.rng_seed,
        block_interval: resolved.block_interval,
        gossip_fanout: rblocksim_core::consensus::GOSSIP_FANOUT_DEFAULT,
        attack: resolved.attack,
        stats_mode: resolved.stats_mode,
    };

    info!(
        "starting run: nodes={} termination={} attack={}",
        run_config.node_count,
        run_config.termination_time,
        output::attack_label(&run_config.attack)
    );

    let outcome = match run(run_config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("rblocksim: run failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if resolved.stats_mode == StatsMode::None {
        info!("no statistics mode selected; nothing to persist");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = persist_results(&resolved, &outcome) {
        eprintln!("rblocksim: could not write results: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn persist_results(
    resolved: &rblocksim_config::cli::ResolvedConfig,
    outcome: &rblocksim_servers::run::RunOutcome,
) -> Result<(), CliError> {
    let cwd = std::env::current_dir().map_err(|e| CliError::ResultsDirUnwritable { path: ".".to_string(), source: e })?;

    let dir = output::reserve_results_dir(
        &cwd,
        resolved.nodes,
        1,
        resolved.block_interval,
        &resolved.attack,
        resolved.rng_seed,
    )
    .map_err(|e| CliError::ResultsDirUnwritable { path: cwd.display().to_string(), source: e })?;

    info!("writing results to {}", dir.display());

    let to_io_err = |e: std::io::Error| CliError::ResultsDirUnwritable { path: dir.display().to_string(), source: e };

    match resolved.stats_mode {
        StatsMode::None => {}
        StatsMode::Selfish => {
            let filename = resolved
                .output
                .clone()
                .unwrap_or_else(|| output::formulaic_results_file_name(resolved.nodes, 1, resolved.block_interval, &resolved.attack, resolved.rng_seed));
            output::write_selfish_aggregate(&dir.join(filename), &outcome.reports).map_err(to_io_err)?;
        }
        StatsMode::Detailed | StatsMode::FiftyOne => {
            for report in &outcome.reports {
                output::write_node_stats_dump(&dir, report).map_err(to_io_err)?;
            }
        }
    }

    if let Some(attacker_id) = outcome.attacker {
        if let Some(report) = outcome.reports.iter().find(|r| r.id == attacker_id) {
            if report.attacker.is_some() {
                output::write_attack_info(&dir, &resolved.attack, attacker_id, report).map_err(to_io_err)?;
            }
        }
    }

    Ok(())
}
