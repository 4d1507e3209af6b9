//! Time-ordered queue of pending events.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::circuit::ComponentId;

/// An event waiting to be delivered to a component.
#[derive(Debug, Clone)]
pub struct ScheduledEvent<T> {
    pub target: ComponentId,
    /// Absolute fire time
    pub at: f64,
    pub payload: T,
    seq: u64,
}

impl<T> PartialEq for ScheduledEvent<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for ScheduledEvent<T> {}

impl<T> PartialOrd for ScheduledEvent<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ScheduledEvent<T> {
    /// Reversed so the max-heap pops the earliest event, oldest first on
    /// ties.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue keyed by fire time with FIFO tie-break.
#[derive(Debug, Clone)]
pub struct EventQueue<T> {
    heap: BinaryHeap<ScheduledEvent<T>>,
    next_seq: u64,
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, target: ComponentId, at: f64, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledEvent {
            target,
            at,
            payload,
            seq,
        });
    }

    /// Fire time of the earliest pending event.
    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|event| event.at)
    }

    /// Remove and return every event due at or before `now`, in fire order.
    pub fn pop_due(&mut self, now: f64) -> Vec<ScheduledEvent<T>> {
        let mut due = Vec::new();
        while self.heap.peek().map_or(false, |event| event.at <= now) {
            due.extend(self.heap.pop());
        }
        due
    }

    /// Drop every event aimed at `target`. Returns how many were dropped.
    pub fn purge(&mut self, target: ComponentId) -> usize {
        let before = self.heap.len();
        self.heap.retain(|event| event.target != target);
        before - self.heap.len()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
