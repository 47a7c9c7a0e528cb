//! Invariant checking shared by every crate in the workspace.
//!
//! The substantive error taxonomies (configuration errors, chain-store
//! errors, runtime errors) live in the crates that own them, each as a
//! `thiserror` enum in the style of `grin_core::core::Error`. This module
//! holds only the one thing every layer needs: a way to fail loudly and
//! uniformly when an invariant the simulator depends on for correctness is
//! violated, rather than let the violation silently corrupt state.

/// Aborts the process with a message identifying which invariant broke.
///
/// Used for conditions that the data model guarantees can never occur
/// (e.g. a chain level with no blocks at a height below the current head).
/// Such violations are bugs, not recoverable runtime errors, so they are
/// not represented as `Result` — matching `ROOT-Sim`'s own `abort()` on
/// invariant failure in the reference implementation.
#[track_caller]
pub fn invariant_violation(what: &str) -> ! {
    panic!("invariant violated: {what}");
}
