//! A node's private view of which transactions it has seen confirmed.

use croaring::Bitmap;

use rblocksim_core::{NodeId, Transaction, TransactionData, TxId};

/// Per-node confirmed/pending transaction tracker.
///
/// `bitmap` is indexed by absolute transaction id across the whole universe
/// (unlike `TransactionData::included`, which is relative to its own
/// window) — a bit set means that node has seen the transaction confirmed
/// in a block on its current chain.
///
/// `[low, high)` is the node's local delivery window: `low` is the first
/// transaction id not yet confirmed, `high` is the first id the node has
/// not yet heard about (whether by direct submission or by propagation
/// delay having elapsed).
pub struct TransactionState {
    bitmap: Bitmap,
    pub low: u32,
    pub high: u32,
}

impl TransactionState {
    pub fn new() -> Self {
        TransactionState {
            bitmap: Bitmap::new(),
            low: 0,
            high: 0,
        }
    }

    /// Advances `low` past every transaction id already confirmed, then
    /// advances `high` to cover every transaction whose delivery time (by
    /// submission or propagation) has elapsed by `now`.
    pub fn deliver_new_transactions(&mut self, now: f64, universe: &[Transaction], txn_count: u32) {
        while self.low < txn_count && self.bitmap.contains(self.low) {
            self.low += 1;
        }

        let mut i = self.high;
        while i < txn_count {
            if universe[i as usize].timestamp > now {
                break;
            }
            i += 1;
        }
        self.high = i;
    }

    /// Builds the per-block transaction selection for a block this node is
    /// about to mine at time `now`, or `None` if nothing is available yet.
    ///
    /// A transaction is eligible if it has not already been confirmed and
    /// either `me` is its sender or its delivery time (by propagation delay
    /// from its sender) has already elapsed.
    ///
    /// Note: `data.high` only advances to the index of the last *eligible*
    /// transaction found plus one, not to `self.high` unconditionally, so a
    /// run of ineligible transactions right before `self.high` is silently
    /// excluded from the block's window rather than carried forward. This
    /// mirrors the reference implementation's `generateTransactionData`
    /// exactly, bug included: an eligible transaction arriving later at the
    /// same index range will simply be picked up by a subsequent block.
    pub fn generate_transaction_data(
        &mut self,
        now: f64,
        me: NodeId,
        universe: &[Transaction],
        txn_count: u32,
        delivery_delay: impl Fn(NodeId, NodeId) -> f64,
    ) -> Option<TransactionData> {
        self.deliver_new_transactions(now, universe, txn_count);
        if self.high <= self.low {
            return None;
        }

        let mut data = TransactionData {
            low: self.low,
            high: self.low,
            included: Bitmap::new(),
        };

        let mut j = 0u32;
        for i in self.low..self.high {
            let txn = &universe[i as usize];
            let delivered = txn.sender == me || txn.timestamp + delivery_delay(txn.sender, me) < now;
            if !self.bitmap.contains(i) && delivered {
                data.high = i;
                data.included.add(j);
            }
            j += 1;
        }
        if data.high != data.low {
            data.high += 1;
        }
        Some(data)
    }

    /// Marks every transaction `data` includes as confirmed, and advances
    /// `high` if the block's window reaches further than this node had
    /// already delivered.
    pub fn apply_block_transactions(&mut self, data: &TransactionData) {
        for i in data.low..data.high {
            if data.included.contains(i - data.low) {
                self.bitmap.add(i);
            }
        }
        self.high = self.high.max(data.high);
    }

    /// Inverse of `apply_block_transactions`: unmarks everything `data`
    /// confirmed, and pulls `low` back if the reverted block's window
    /// started earlier than this node's current `low`.
    pub fn revert_applied_block_transactions(&mut self, data: &TransactionData) {
        for i in data.low..data.high {
            if data.included.contains(i - data.low) {
                self.bitmap.remove(i);
            }
        }
        self.low = self.low.min(data.low);
    }

    pub fn is_confirmed(&self, id: TxId) -> bool {
        self.bitmap.contains(id.0)
    }
}

impl Default for TransactionState {
    fn default() -> Self {
        Self::new()
    }
}
