//! The transaction ledger: generation of the shared transaction universe
//! and each node's private confirmed/pending view of it.

pub mod state;
pub mod universe;

pub use state::TransactionState;
pub use universe::generate_transactions;
