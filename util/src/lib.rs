//! Logging and RNG plumbing shared by every crate in the workspace.

pub mod logger;
pub mod rng;

pub use rng::Rng;
