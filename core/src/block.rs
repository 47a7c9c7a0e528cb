//! The block as it travels over the wire between simulated nodes.

use crate::ids::NodeId;
use crate::transaction::TransactionData;

/// A mined block, as propagated between nodes.
///
/// `prev_block_miner` together with `height` is how a receiver locates the
/// block's parent in the sender's fork tree: the parent is the node at
/// `height - 1` mined by `prev_block_miner`, unless that miner produced more
/// than one block at that height, in which case the chain store falls back
/// to matching against the sender's reported chain index (see
/// `rblocksim_chain::types::Parent`).
///
/// Blocks never leave the process as bytes (the simulation delivers them as
/// in-memory events, the way ROOT-Sim delivers its `struct Block` payloads),
/// so this carries no `Serialize`/`Deserialize` impl.
#[derive(Clone, Debug)]
pub struct Block {
    pub timestamp: f64,
    pub size: u32,
    pub miner: NodeId,
    pub prev_block_miner: NodeId,
    pub height: u64,
    pub sender: NodeId,
    pub is_attack_block: bool,
    pub transaction_data: TransactionData,
}

impl Block {
    pub fn genesis() -> Self {
        Block {
            timestamp: 0.0,
            size: 0,
            miner: NodeId::default(),
            prev_block_miner: crate::ids::GENESIS_MINER,
            height: 0,
            sender: crate::ids::GENESIS_MINER,
            is_attack_block: false,
            transaction_data: TransactionData::empty(),
        }
    }

    /// Mirrors `Block.c`'s `validateBlock`: every block a node receives is
    /// accepted, at a fixed simulated cost. The returned delay is reported
    /// to the caller but, as in the reference, never actually advances the
    /// receive-time used to link the block into the chain.
    pub fn validate(&self) -> (bool, f64) {
        (true, crate::consensus::BLOCK_VALIDATION_TIME)
    }
}
