//! Event scheduling
//!
//! The scheduler owns the simulation clock and the pending-event collection.
//! Events come back in non-decreasing time order; ties at an identical
//! timestamp break by insertion order, so runs are deterministic for a
//! given draw sequence.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use super::types::{Event, EventKind};

/// Heap entry: ordered by time, then by insertion sequence
#[derive(Debug, Clone, Copy)]
struct QueuedEvent {
    at: OrderedFloat<f64>,
    seq: u64,
    kind: EventKind,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at).then(self.seq.cmp(&other.seq))
    }
}

/// Simulation clock plus the time-ordered pending-event collection
#[derive(Debug, Default)]
pub struct Scheduler {
    clock: f64,
    queue: BinaryHeap<Reverse<QueuedEvent>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time
    pub fn now(&self) -> f64 {
        self.clock
    }

    /// Schedule an event `delay` time units from now
    ///
    /// Panics on a negative delay; correct callers never produce one.
    pub fn insert(&mut self, delay: f64, kind: EventKind) {
        assert!(delay >= 0.0, "event delay must be non-negative: {}", delay);
        let event = QueuedEvent {
            at: OrderedFloat(self.clock + delay),
            seq: self.next_seq,
            kind,
        };
        self.next_seq += 1;
        self.queue.push(Reverse(event));
    }

    /// Remove the earliest pending event and advance the clock to its time
    ///
    /// Returns `None` once the queue is empty, which is the run's normal
    /// termination condition.
    pub fn pop_next(&mut self) -> Option<Event> {
        let Reverse(next) = self.queue.pop()?;
        debug_assert!(next.at.0 >= self.clock);
        self.clock = next.at.0;
        Some(Event {
            at: next.at.0,
            kind: next.kind,
        })
    }

    /// Number of events currently pending
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total events scheduled over the scheduler's lifetime
    pub fn scheduled_count(&self) -> u64 {
        self.next_seq
    }

    /// Snapshot of the pending events, in no particular order
    pub fn pending(&self) -> impl Iterator<Item = Event> + '_ {
        self.queue.iter().map(|Reverse(e)| Event {
            at: e.at.0,
            kind: e.kind,
        })
    }
}
