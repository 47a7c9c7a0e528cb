//! Core data model shared by every other `rblocksim` crate: node and
//! transaction identifiers, the wire-format `Block`, the transaction
//! universe, consensus constants, and the one piece of genuinely global
//! mutable state (the honest-hashpower accumulator).

pub mod block;
pub mod consensus;
pub mod fatal;
pub mod global;
pub mod ids;
pub mod transaction;

pub use block::Block;
pub use ids::{NodeId, TxId, GENESIS_MINER};
pub use transaction::{Transaction, TransactionData};
