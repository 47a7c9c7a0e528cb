//! The fork-tree blockchain store.
//!
//! Levels are kept in two arrays, `old_levels` and `current_levels`, each
//! holding `DEPTH_TO_KEEP` entries; together they cover a `2 *
//! DEPTH_TO_KEEP`-high sliding window ending at `max_height`. When a new
//! block's height would run off the end of that window, `old_levels` is
//! cleared and the two arrays are swapped, shifting the window forward by
//! `DEPTH_TO_KEEP` — the arrays are never reallocated, just relabeled.

use rblocksim_core::consensus::DEPTH_TO_KEEP;
use rblocksim_core::{Block, NodeId};
use rblocksim_ledger::TransactionState;

use crate::error::{Error, Result};
use crate::selection::ChainSelector;
use crate::types::{ChainLevel, ChainNode, NodeRef};

/// Every chain node touched by a reorg, in the order it was reverted or
/// applied. Callers that track per-node statistics (see
/// `rblocksim_servers::stats`) walk this to update their own state exactly
/// when the chain store does, without the store needing to know anything
/// about statistics.
#[derive(Default, Debug)]
pub struct Reorg {
    pub reverted: Vec<NodeRef>,
    pub applied: Vec<NodeRef>,
}

pub struct Blockchain {
    old_levels: Vec<ChainLevel>,
    current_levels: Vec<ChainLevel>,
    min_height: u64,
    max_height: u64,
    height: u64,
    main_chain_index: usize,
}

impl Blockchain {
    pub fn new() -> Self {
        let mut old_levels = vec![ChainLevel::default(); DEPTH_TO_KEEP as usize];
        old_levels[0].nodes.push(ChainNode::genesis());
        Blockchain {
            old_levels,
            current_levels: vec![ChainLevel::default(); DEPTH_TO_KEEP as usize],
            min_height: 0,
            max_height: 0,
            height: 0,
            main_chain_index: 0,
        }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn min_height(&self) -> u64 {
        self.min_height
    }

    pub fn max_height(&self) -> u64 {
        self.max_height
    }

    pub fn main_chain_head(&self) -> NodeRef {
        NodeRef { height: self.height, index: self.main_chain_index }
    }

    fn level_slot(&self, height: u64) -> Result<usize> {
        if height < self.min_height {
            return Err(Error::HeightBelowWindow { height, min_height: self.min_height });
        }
        let rel = height - self.min_height;
        if rel >= 2 * DEPTH_TO_KEEP {
            return Err(Error::HeightAboveWindow { height });
        }
        Ok(rel as usize)
    }

    fn level(&self, height: u64) -> Result<&ChainLevel> {
        let rel = self.level_slot(height)?;
        Ok(if rel < DEPTH_TO_KEEP as usize {
            &self.old_levels[rel]
        } else {
            &self.current_levels[rel - DEPTH_TO_KEEP as usize]
        })
    }

    fn level_mut(&mut self, height: u64) -> Result<&mut ChainLevel> {
        let rel = self.level_slot(height)?;
        Ok(if rel < DEPTH_TO_KEEP as usize {
            &mut self.old_levels[rel]
        } else {
            &mut self.current_levels[rel - DEPTH_TO_KEEP as usize]
        })
    }

    pub fn node(&self, r: NodeRef) -> &ChainNode {
        match self.level(r.height) {
            Ok(level) => level.nodes.get(r.index).unwrap_or_else(|| {
                rblocksim_core::fatal::invariant_violation("NodeRef index out of bounds for its level")
            }),
            Err(e) => rblocksim_core::fatal::invariant_violation(&e.to_string()),
        }
    }

    fn node_mut(&mut self, r: NodeRef) -> &mut ChainNode {
        match self.level_mut(r.height) {
            Ok(level) => {
                if r.index >= level.nodes.len() {
                    rblocksim_core::fatal::invariant_violation("NodeRef index out of bounds for its level");
                }
                &mut level.nodes[r.index]
            }
            Err(e) => rblocksim_core::fatal::invariant_violation(&e.to_string()),
        }
    }

    fn parent_ref(&self, r: NodeRef) -> Option<NodeRef> {
        let node = self.node(r);
        node.parent_index().map(|index| NodeRef { height: r.height - 1, index })
    }

    /// Looks up a node mined by `miner` at `height`, if one exists in the
    /// currently-kept window.
    pub fn find_node(&self, miner: NodeId, height: u64) -> Option<NodeRef> {
        if height > self.max_height {
            return None;
        }
        let level = self.level(height).ok()?;
        level
            .nodes
            .iter()
            .position(|n| n.miner == miner)
            .map(|index| NodeRef { height, index })
    }

    /// Reconstructs the wire-format block for a stored node, so it can be
    /// re-sent (e.g. when answering a parent request).
    pub fn block_from_node(&self, r: NodeRef) -> Block {
        let node = self.node(r);
        let prev_block_miner = if node.is_orphan() {
            node.parent_miner_id().unwrap_or_else(|| {
                rblocksim_core::fatal::invariant_violation("orphan node has no parent_miner_id")
            })
        } else {
            let parent = self.parent_ref(r).unwrap_or_else(|| {
                rblocksim_core::fatal::invariant_violation("non-orphan node has no parent_index")
            });
            self.node(parent).miner
        };
        Block {
            timestamp: node.timestamp,
            size: 10,
            miner: node.miner,
            prev_block_miner,
            height: node.height,
            sender: node.miner,
            is_attack_block: false,
            transaction_data: node.transaction_data.clone(),
        }
    }

    fn move_chain_forward(&mut self) {
        for level in self.old_levels.iter_mut() {
            level.clear();
        }
        std::mem::swap(&mut self.old_levels, &mut self.current_levels);
        self.min_height += DEPTH_TO_KEEP;
    }

    fn apply_node(&mut self, ledger: &mut TransactionState, r: NodeRef) {
        let node = self.node(r);
        ledger.apply_block_transactions(&node.transaction_data);
        self.height = node.height;
    }

    fn revert_node(&mut self, ledger: &mut TransactionState, r: NodeRef) -> NodeRef {
        let node = self.node(r);
        ledger.revert_applied_block_transactions(&node.transaction_data);
        let parent = self
            .parent_ref(r)
            .unwrap_or_else(|| rblocksim_core::fatal::invariant_violation("reverting a node with no parent"));
        self.height = node.height - 1;
        self.main_chain_index = parent.index;
        parent
    }

    /// Links every orphan descending from `parent` (at `parent_index`)
    /// starting at `child_height`, and returns the node reference of the
    /// best-scoring branch that resulted, if any.
    fn unorphan_descendants(
        &mut self,
        parent: NodeRef,
        child_height: u64,
        me: NodeId,
        selector: &dyn ChainSelector,
    ) -> Option<NodeRef> {
        if child_height > self.max_height {
            return None;
        }

        let parent_node = self.node(parent).clone();
        let level = match self.level(child_height) {
            Ok(l) => l,
            Err(_) => return None,
        };
        let candidate_indices: Vec<usize> = level
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_orphan() && n.parent_miner_id() == Some(parent_node.miner))
            .map(|(i, _)| i)
            .collect();

        let mut best: Option<NodeRef> = None;
        for index in candidate_indices {
            let orphan_ref = NodeRef { height: child_height, index };
            {
                let orphan = self.node_mut(orphan_ref);
                orphan.unorphan(parent.index);
                orphan.ancestors_mined = parent_node.ancestors_mined;
                orphan.score = parent_node.score + 1;
            }

            best = Some(match best {
                None => orphan_ref,
                Some(current_best) => selector.best(self, current_best, orphan_ref),
            });

            if let Some(grandchild_best) = self.unorphan_descendants(orphan_ref, child_height + 1, me, selector) {
                best = Some(match best {
                    None => grandchild_best,
                    Some(current_best) => selector.best(self, current_best, grandchild_best),
                });
            }
        }
        best
    }

    /// Walks the old main chain and the new candidate chain back to their
    /// common ancestor, reverting the former and applying the latter, and
    /// installs `new_head` as the new main chain tip.
    pub fn switch_chains(&mut self, ledger: &mut TransactionState, new_head: NodeRef) -> Reorg {
        let mut reorg = Reorg::default();

        let mut to_apply = Vec::new();
        let mut walker = new_head;
        while walker.height > self.height {
            to_apply.push(walker);
            walker = self
                .parent_ref(walker)
                .unwrap_or_else(|| rblocksim_core::fatal::invariant_violation("walked off the new chain's root"));
        }

        let mut main_walker = self.main_chain_head();
        while self.node(main_walker).height > new_head.height {
            reorg.reverted.push(main_walker);
            main_walker = self.revert_node(ledger, main_walker);
        }

        while main_walker != walker {
            reorg.reverted.push(main_walker);
            main_walker = self.revert_node(ledger, main_walker);

            to_apply.push(walker);
            walker = self
                .parent_ref(walker)
                .unwrap_or_else(|| rblocksim_core::fatal::invariant_violation("walked off the new chain's root"));
        }

        for node_ref in to_apply.into_iter().rev() {
            self.apply_node(ledger, node_ref);
            reorg.applied.push(node_ref);
        }

        self.main_chain_index = new_head.index;
        reorg
    }

    /// Switches to `candidate` if the selector prefers it over the current
    /// main chain head.
    pub fn maybe_switch_chains(
        &mut self,
        ledger: &mut TransactionState,
        candidate: NodeRef,
        selector: &dyn ChainSelector,
    ) -> Reorg {
        let head = self.main_chain_head();
        if selector.best(self, head, candidate) == candidate {
            self.switch_chains(ledger, candidate)
        } else {
            Reorg::default()
        }
    }

    /// Adds a block to the local view of the chain: links it to its parent
    /// if known (otherwise marks it an orphan), unorphans any of its own
    /// descendants that were waiting on it, and switches the main chain to
    /// it if it (or the best of its newly-unorphaned descendants) beats the
    /// current head.
    pub fn add_block(
        &mut self,
        now: f64,
        me: NodeId,
        ledger: &mut TransactionState,
        block: &Block,
        selector: &dyn ChainSelector,
    ) -> (NodeRef, Reorg) {
        if block.height > self.max_height {
            self.max_height = block.height;
            if block.height >= self.min_height + 2 * DEPTH_TO_KEEP {
                self.move_chain_forward();
            }
        }

        let mut node = ChainNode {
            parent: crate::types::Parent::Pending(block.prev_block_miner),
            timestamp: now,
            miner: block.miner,
            height: block.height,
            score: 0,
            ancestors_mined: 0,
            flags: Default::default(),
            transaction_data: block.transaction_data.clone(),
        };

        let parent_found = if block.height > 0 {
            self.level(block.height - 1)
                .ok()
                .and_then(|level| level.nodes.iter().position(|n| n.miner == block.prev_block_miner && !n.is_orphan()))
        } else {
            None
        };

        let level = self.level_mut(block.height).unwrap_or_else(|e| rblocksim_core::fatal::invariant_violation(&e.to_string()));
        let own_index = level.nodes.len();
        let own_ref = NodeRef { height: block.height, index: own_index };

        let ancestors_mined_bonus = if block.miner == me { 1 } else { 0 };

        match parent_found {
            Some(parent_index) => {
                let parent_ref = NodeRef { height: block.height - 1, index: parent_index };
                let parent = self.node(parent_ref);
                node.parent = crate::types::Parent::Linked(parent_index);
                node.ancestors_mined = parent.ancestors_mined + ancestors_mined_bonus;
                node.score = parent.score + 1;
                self.level_mut(block.height).unwrap().nodes.push(node);
            }
            None => {
                node.set_orphan();
                self.level_mut(block.height).unwrap().nodes.push(node);
                return (own_ref, Reorg::default());
            }
        }

        let unorphaned = self.unorphan_descendants(own_ref, block.height + 1, me, selector);
        let best = match unorphaned {
            Some(other) => selector.best(self, own_ref, other),
            None => own_ref,
        };

        let reorg = self.maybe_switch_chains(ledger, best, selector);
        (own_ref, reorg)
    }

    #[cfg(test)]
    pub(crate) fn push_test_node(&mut self, height: u64, node: ChainNode) -> NodeRef {
        let level = self.level_mut(height).unwrap();
        let index = level.nodes.len();
        level.nodes.push(node);
        NodeRef { height, index }
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}
