//! The shared transaction universe and the per-node view of it.

use croaring::Bitmap;
use serde::{Deserialize, Serialize};

use crate::ids::{NodeId, TxId};

/// A single transaction in the shared, append-only universe generated at
/// startup. Every node sees the same `Transaction` values; what differs
/// between nodes is which ones they consider confirmed, tracked by
/// `TransactionData`.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    pub timestamp: f64,
    pub sender: NodeId,
    pub size: u32,
    pub fee: u64,
}

/// A node's bitmap over a contiguous, sliding window `[low, high)` of the
/// transaction universe: bit `j` of `included` records whether transaction
/// `low + j` has been confirmed in that node's view of the chain.
///
/// The window advances as transactions are generated and confirmed, and old
/// entries are dropped by shrinking `low`; `included` is always sized to
/// `high - low` bits, never to the whole universe.
#[derive(Clone, Debug)]
pub struct TransactionData {
    pub low: u32,
    pub high: u32,
    pub included: Bitmap,
}

impl TransactionData {
    pub fn empty() -> Self {
        TransactionData {
            low: 0,
            high: 0,
            included: Bitmap::new(),
        }
    }

    /// True if `id` falls within the tracked window, regardless of whether
    /// it is marked included.
    pub fn in_window(&self, id: TxId) -> bool {
        id.0 >= self.low && id.0 < self.high
    }

    fn relative_index(&self, id: TxId) -> u32 {
        id.0 - self.low
    }

    pub fn is_included(&self, id: TxId) -> bool {
        self.in_window(id) && self.included.contains(self.relative_index(id))
    }

    pub fn mark_included(&mut self, id: TxId) {
        debug_assert!(self.in_window(id));
        self.included.add(self.relative_index(id));
    }

    pub fn mark_excluded(&mut self, id: TxId) {
        debug_assert!(self.in_window(id));
        self.included.remove(self.relative_index(id));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn window_membership() {
        let mut data = TransactionData {
            low: 10,
            high: 20,
            included: Bitmap::new(),
        };
        assert!(data.in_window(TxId(10)));
        assert!(data.in_window(TxId(19)));
        assert!(!data.in_window(TxId(20)));
        assert!(!data.in_window(TxId(9)));

        data.mark_included(TxId(12));
        assert!(data.is_included(TxId(12)));
        assert!(!data.is_included(TxId(13)));

        data.mark_excluded(TxId(12));
        assert!(!data.is_included(TxId(12)));
    }
}
