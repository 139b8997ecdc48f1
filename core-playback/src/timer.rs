//! Deterministic timer queue.
//!
//! The scheduler never spawns timers. Deadlines live here, keyed by the
//! injected clock's milliseconds, and fire only when the host calls
//! [`VisibilityScheduler::poll`](crate::VisibilityScheduler::poll). Tests
//! advance a `ManualClock` and poll; production hosts poll from their frame
//! callback or from [`run_until_idle`](crate::run_until_idle).

use std::collections::{BTreeMap, HashMap};

/// Handle to one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// Timers ordered by deadline, ties broken by scheduling order.
#[derive(Debug)]
pub struct TimerQueue<K> {
    next_seq: u64,
    queue: BTreeMap<(u64, u64), K>,
    deadlines: HashMap<u64, u64>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline_ms: u64, key: K) -> TimerToken {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((deadline_ms, seq), key);
        self.deadlines.insert(seq, deadline_ms);
        TimerToken(seq)
    }

    /// Cancels a pending timer. Cancelling a fired or unknown token is a no-op.
    pub fn cancel(&mut self, token: TimerToken) -> Option<K> {
        let deadline = self.deadlines.remove(&token.0)?;
        self.queue.remove(&(deadline, token.0))
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.deadlines.contains_key(&token.0)
    }

    /// Removes and returns every timer with `deadline <= now_ms`.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<(TimerToken, K)> {
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            let (deadline, seq) = *entry.key();
            if deadline > now_ms {
                break;
            }
            let key = entry.remove();
            self.deadlines.remove(&seq);
            due.push((TimerToken(seq), key));
        }
        due
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(300, "c");
        timers.schedule(100, "a");
        timers.schedule(200, "b");

        assert_eq!(timers.next_deadline(), Some(100));
        let fired: Vec<&str> = timers.drain_due(250).into_iter().map(|(_, k)| k).collect();
        assert_eq!(fired, vec!["a", "b"]);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_deadline(), Some(300));
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(50, 1);
        timers.schedule(50, 2);
        timers.schedule(50, 3);

        let fired: Vec<i32> = timers.drain_due(50).into_iter().map(|(_, k)| k).collect();
        assert_eq!(fired, vec![1, 2, 3]);
        assert!(timers.is_empty());
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut timers = TimerQueue::new();
        let keep = timers.schedule(10, "keep");
        let drop = timers.schedule(10, "drop");

        assert_eq!(timers.cancel(drop), Some("drop"));
        assert_eq!(timers.cancel(drop), None);
        assert!(timers.is_pending(keep));
        assert!(!timers.is_pending(drop));

        let fired = timers.drain_due(10);
        assert_eq!(fired, vec![(keep, "keep")]);
        assert!(!timers.is_pending(keep));
        assert_eq!(timers.cancel(keep), None);
    }

    #[test]
    fn nothing_due_before_deadline() {
        let mut timers = TimerQueue::new();
        timers.schedule(100, ());
        assert!(timers.drain_due(99).is_empty());
        assert_eq!(timers.drain_due(100).len(), 1);
        assert_eq!(timers.next_deadline(), None);
    }
}
