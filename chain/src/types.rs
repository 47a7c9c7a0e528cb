//! The fork-tree's node and level types.

use bitflags::bitflags;

use rblocksim_core::{NodeId, TransactionData};

bitflags! {
    /// Per-node status flags. `ORPHAN` is load-bearing; `INCLUDED` mirrors
    /// a bit the reference implementation's flag byte reserves but never
    /// reads, kept here (rather than dropped) the way grin's pipe module
    /// keeps block-processing `Options` as a flag set rather than a bare
    /// `bool`, so a future use doesn't need to change the node layout
    /// again.
    #[derive(Default)]
    pub struct NodeFlags: u8 {
        /// Set while this node's parent has not yet been linked in the
        /// local view of the chain.
        const ORPHAN = 0b0000_0001;
        /// Reserved, currently unused by any selection or reorg logic.
        const INCLUDED = 0b0000_0010;
    }
}

/// A node's parent reference, discriminated by whether the link has been
/// resolved yet. The reference implementation encodes this as an untagged
/// union disambiguated by the `ORPHAN` flag; here it is a proper sum type,
/// so a caller can't read `parent_index` off an orphan node or vice versa.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Parent {
    /// Resolved: the parent is at this offset within the previous height's
    /// `ChainLevel`.
    Linked(usize),
    /// Unresolved: only the parent's miner id is known, from the wire
    /// block's `prev_block_miner`. Kept so the parent can be recognized and
    /// linked once it arrives.
    Pending(NodeId),
}

/// A block as stored in the local fork tree.
#[derive(Clone, Debug)]
pub struct ChainNode {
    pub parent: Parent,
    pub timestamp: f64,
    pub miner: NodeId,
    pub height: u64,
    pub score: u64,
    pub ancestors_mined: u64,
    pub flags: NodeFlags,
    pub transaction_data: TransactionData,
}

impl ChainNode {
    pub fn genesis() -> Self {
        ChainNode {
            parent: Parent::Pending(rblocksim_core::ids::GENESIS_MINER),
            timestamp: 0.0,
            miner: rblocksim_core::ids::GENESIS_MINER,
            height: 0,
            score: 0,
            ancestors_mined: 0,
            flags: NodeFlags::empty(),
            transaction_data: TransactionData::empty(),
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.flags.contains(NodeFlags::ORPHAN)
    }

    pub fn set_orphan(&mut self) {
        self.flags.insert(NodeFlags::ORPHAN);
    }

    /// The miner id to match future orphan-linking attempts against,
    /// whichever state the parent reference is in. Only meaningful before
    /// `unorphan` resolves the link; callers that already have the parent
    /// node should prefer comparing against its `miner` directly.
    pub fn parent_miner_id(&self) -> Option<NodeId> {
        match self.parent {
            Parent::Pending(miner) => Some(miner),
            Parent::Linked(_) => None,
        }
    }

    pub fn parent_index(&self) -> Option<usize> {
        match self.parent {
            Parent::Linked(index) => Some(index),
            Parent::Pending(_) => None,
        }
    }

    pub fn unorphan(&mut self, parent_index: usize) {
        self.flags.remove(NodeFlags::ORPHAN);
        self.parent = Parent::Linked(parent_index);
    }
}

/// All chain nodes mined at a given height. More than one entry means a
/// fork existed at that height, whether still live or since resolved.
#[derive(Default, Clone, Debug)]
pub struct ChainLevel {
    pub nodes: Vec<ChainNode>,
}

impl ChainLevel {
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// A `(height, index)` address of a node within the fork tree.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct NodeRef {
    pub height: u64,
    pub index: usize,
}
