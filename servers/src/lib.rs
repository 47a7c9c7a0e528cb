//! Per-node event handling, attacker strategies, statistics, the
//! sequential kernel, and orchestration — the glue tying every other crate
//! in the workspace together into one runnable simulation.

pub mod attacker;
pub mod error;
pub mod kernel;
pub mod node;
pub mod run;
pub mod stats;
pub mod world;

pub use error::{Error, Result};
pub use kernel::{Event, Kernel, SequentialKernel};
pub use run::{run, RunConfig, RunOutcome};
