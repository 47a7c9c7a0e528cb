//! Fork-tree chain store: block linking, orphan resolution, chain
//! selection, and reorgs.

pub mod error;
pub mod selection;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use selection::{AttackerSelector, ChainSelector, HonestSelector};
pub use store::{Blockchain, Reorg};
pub use types::{ChainLevel, ChainNode, NodeFlags, NodeRef, Parent};
