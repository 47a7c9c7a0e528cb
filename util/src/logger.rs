//! Logging wrapper used throughout the workspace, in the same spirit as
//! `grin_util::logger`: one `init` call at the top of `main`, `log::*!`
//! macros everywhere else. Grin drives a full `log4rs` pipeline (rolling
//! file appenders, a module-path filter, a panic-to-log hook) because a
//! long-running node needs log rotation and a TUI mode to coexist; a
//! simulator that runs once to completion and prints its own summary does
//! not, so this wraps `env_logger` instead and keeps only the piece of
//! grin's design that still pulls its weight here: sending panics to the
//! log before they reach stderr.

use std::panic;

/// Initializes the global logger from `RUST_LOG`, defaulting to `info` if
/// unset. Safe to call more than once; only the first call takes effect.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
    send_panics_to_log();
}

/// Initializes a logger suited for test output: always debug level,
/// writing to the test harness's captured stdout.
pub fn init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}

fn send_panics_to_log() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("unnamed");
        log::error!("thread '{}' panicked: {}", thread_name, info);
        default_hook(info);
    }));
}
