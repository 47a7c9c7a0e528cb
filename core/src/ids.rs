//! Strongly typed identifiers for nodes and transactions.
//!
//! Mirrors the newtype discipline grin uses for `Hash`, `Commitment` and
//! `ShortId`: a bare `u32` is never passed where a node or transaction index
//! is meant, so a mixed-up argument order is a type error instead of a bug
//! report.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a simulated node (an LP in the underlying discrete-event
/// model) by its index in `0..node_count`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        NodeId(v)
    }
}

/// Sentinel miner used by the genesis block, which has no real parent or
/// miner. Comparisons against this value are how the chain store recognizes
/// the root of the fork tree.
pub const GENESIS_MINER: NodeId = NodeId(u32::MAX);

/// Identifies a transaction by its position in the shared, append-only
/// transaction universe.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize)]
pub struct TxId(pub u32);

impl TxId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TxId {
    fn from(v: u32) -> Self {
        TxId(v)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn genesis_miner_is_not_a_real_node() {
        assert_ne!(GENESIS_MINER, NodeId(0));
        assert_ne!(GENESIS_MINER, NodeId(1_000));
    }

    #[test]
    fn index_roundtrips() {
        assert_eq!(NodeId(42).index(), 42usize);
        assert_eq!(TxId(7).index(), 7usize);
    }
}
