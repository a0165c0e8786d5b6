//! Time-keyed event queue.
//!
//! Events are keyed by simulation seconds, not by frame count, so a delay fires at the same
//! point on the timeline whatever the frame rate is. Events due at the same time come out in
//! the order they were scheduled.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u64);

#[derive(Debug, Clone)]
struct Scheduled<E> {
    at: f64,
    id: EventId,
    event: E,
}

impl<E> Scheduled<E> {
    fn order(&self, at: f64, id: EventId) -> Ordering {
        self.at.total_cmp(&at).then(self.id.cmp(&id))
    }
}

#[derive(Debug, Clone)]
pub struct EventQueue<E> {
    // Sorted by (at, id).
    pending: Vec<Scheduled<E>>,
    next_id: u64,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` at absolute time `at`. A NaN time is due immediately.
    pub fn schedule_at(&mut self, at: f64, event: E) -> EventId {
        let at = if at.is_nan() { f64::NEG_INFINITY } else { at };
        let id = EventId(self.next_id);
        self.next_id += 1;
        let idx = self
            .pending
            .partition_point(|s| s.order(at, id) == Ordering::Less);
        self.pending.insert(idx, Scheduled { at, id, event });
        id
    }

    pub fn schedule_after(&mut self, now: f64, delay: f64, event: E) -> EventId {
        self.schedule_at(now + delay.max(0.0), event)
    }

    pub fn cancel(&mut self, id: EventId) -> bool {
        match self.pending.iter().position(|s| s.id == id) {
            Some(idx) => {
                self.pending.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Drop every pending event matching `pred`, returning how many were dropped.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&E) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|s| !pred(&s.event));
        before - self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove and return every event due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<E> {
        let due = self.pending.partition_point(|s| s.at <= now);
        self.pending.drain(..due).map(|s| s.event).collect()
    }

    pub fn next_due(&self) -> Option<f64> {
        self.pending.first().map(|s| s.at)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
