//! The sequential discrete-event kernel: a min-heap of `(time, node)`
//! deliveries, with retractable `GenerateBlock` timers.
//!
//! The reference implementation runs on ROOT-Sim, a parallel/optimistic
//! simulation kernel; this port only ever needs the single-threaded,
//! non-speculative subset of that contract (events delivered to each LP in
//! nondecreasing timestamp order), so a plain binary heap stands in for it.
//! `GenerateBlock` is the one event type that needs to be cancellable: a
//! node only ever wants its *next* mining timer live, so scheduling a new
//! one invalidates whichever one is already pending. Rather than actually
//! remove the stale entry from the heap (expensive for a binary heap), each
//! node carries a generation counter; a popped `GenerateBlock` whose token
//! doesn't match the node's current generation is simply dropped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rblocksim_core::{Block, NodeId};

/// Everything a node can be asked to handle. `Init` and `BarrierInit`
/// correspond to the reference event loop's `LP_INIT` and
/// `RBLOCKSIM_INIT`; there is no `Fini` variant here because termination is
/// driven directly by the orchestrator once the heap runs dry, rather than
/// scheduled as an event (see `rblocksim_servers::run`).
#[derive(Clone, Debug)]
pub enum Event {
    Init,
    BarrierInit,
    GenerateBlock { token: u64 },
    ReceiveBlock { block: Block },
    RequestBlock { requester: NodeId, miner: NodeId, height: u64 },
}

struct Scheduled {
    time: f64,
    seq: u64,
    node: NodeId,
    event: Event,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}
impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    /// Reversed, so `BinaryHeap` (a max-heap) pops the earliest time first;
    /// `seq` breaks ties in FIFO order so same-timestamp events are
    /// delivered in schedule order, matching a sequential kernel's queue.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .partial_cmp(&self.time)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A single delivery popped off the kernel: the node it's addressed to,
/// the time it fires at, and the event itself.
pub struct Delivery {
    pub time: f64,
    pub node: NodeId,
    pub event: Event,
}

/// What a node handler needs from the kernel: the ability to schedule
/// ordinary events and retractable mining timers.
pub trait Kernel {
    fn schedule(&mut self, node: NodeId, time: f64, event: Event);
    /// Schedules a `GenerateBlock` timer for `node` at `time`, invalidating
    /// whichever one (if any) is already pending for that node.
    fn schedule_generate_block(&mut self, node: NodeId, time: f64);
}

pub struct SequentialKernel {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
    generation: Vec<u64>,
}

impl SequentialKernel {
    pub fn new(node_count: u32) -> Self {
        SequentialKernel {
            heap: BinaryHeap::new(),
            next_seq: 0,
            generation: vec![0; node_count as usize],
        }
    }

    /// Pops the next live delivery in nondecreasing timestamp order,
    /// silently discarding any stale `GenerateBlock` whose token no longer
    /// matches its node's current generation.
    pub fn pop(&mut self) -> Option<Delivery> {
        loop {
            let scheduled = self.heap.pop()?;
            if let Event::GenerateBlock { token } = scheduled.event {
                if token != self.generation[scheduled.node.index()] {
                    continue;
                }
            }
            return Some(Delivery {
                time: scheduled.time,
                node: scheduled.node,
                event: scheduled.event,
            });
        }
    }
}

impl Kernel for SequentialKernel {
    fn schedule(&mut self, node: NodeId, time: f64, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { time, seq, node, event });
    }

    fn schedule_generate_block(&mut self, node: NodeId, time: f64) {
        self.generation[node.index()] += 1;
        let token = self.generation[node.index()];
        self.schedule(node, time, Event::GenerateBlock { token });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn delivers_in_nondecreasing_time_order() {
        let mut kernel = SequentialKernel::new(2);
        kernel.schedule(NodeId(0), 5.0, Event::BarrierInit);
        kernel.schedule(NodeId(1), 1.0, Event::BarrierInit);
        kernel.schedule(NodeId(0), 3.0, Event::BarrierInit);

        let first = kernel.pop().unwrap();
        assert_eq!(first.time, 1.0);
        assert_eq!(first.node, NodeId(1));
        let second = kernel.pop().unwrap();
        assert_eq!(second.time, 3.0);
        let third = kernel.pop().unwrap();
        assert_eq!(third.time, 5.0);
        assert!(kernel.pop().is_none());
    }

    #[test]
    fn same_timestamp_events_are_fifo() {
        let mut kernel = SequentialKernel::new(1);
        kernel.schedule(NodeId(0), 1.0, Event::Init);
        kernel.schedule(NodeId(0), 1.0, Event::BarrierInit);
        assert!(matches!(kernel.pop().unwrap().event, Event::Init));
        assert!(matches!(kernel.pop().unwrap().event, Event::BarrierInit));
    }

    #[test]
    fn rescheduling_generate_block_retracts_the_stale_timer() {
        let mut kernel = SequentialKernel::new(1);
        kernel.schedule_generate_block(NodeId(0), 10.0);
        kernel.schedule_generate_block(NodeId(0), 5.0);

        let delivery = kernel.pop().unwrap();
        assert_eq!(delivery.time, 5.0, "only the latest timer should ever be delivered");
        assert!(kernel.pop().is_none(), "the retracted timer must not be delivered at all");
    }
}
