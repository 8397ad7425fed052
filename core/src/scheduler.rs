use alloc::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Milliseconds on the scheduler's virtual clock.
pub type Millis = u64;

/// Generation counter used to invalidate deferred work.
///
/// Tasks capture the current epoch when scheduled. Bumping the epoch makes every earlier capture
/// stale, and stale tasks are dropped when they come due.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Epoch(u64);

impl Epoch {
    pub fn bump(&mut self) -> Self {
        self.0 = self.0.wrapping_add(1);
        *self
    }

    pub fn is_current(self, current: Epoch) -> bool {
        self == current
    }
}

/// Queue of deferred tasks ordered by due time.
///
/// The clock only moves when the owner says so. Tasks due at the same instant run in the order they
/// were scheduled.
#[derive(Clone, Debug, PartialEq)]
pub struct Scheduler<T> {
    now: Millis,
    next_seq: u64,
    queue: BTreeMap<(Millis, u64), T>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queues `task` to run `delay` from now, returning its due time.
    pub fn schedule(&mut self, delay: Millis, task: T) -> Millis {
        let due = self.now.saturating_add(delay);
        self.queue.insert((due, self.next_seq), task);
        self.next_seq += 1;
        due
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.queue.keys().next().map(|&(due, _)| due)
    }

    /// Removes the earliest task due no later than `until`, moving the clock to its due time.
    pub fn pop_due(&mut self, until: Millis) -> Option<(Millis, T)> {
        let entry = self.queue.first_entry()?;
        let (due, _) = *entry.key();
        if due > until {
            return None;
        }
        let task = entry.remove();
        self.now = self.now.max(due);
        Some((due, task))
    }

    /// Moves the clock forward without running anything. The clock never goes back.
    pub fn advance_to(&mut self, until: Millis) {
        self.now = self.now.max(until);
    }

    /// Drops every queued task. The clock keeps its value.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn drain(scheduler: &mut Scheduler<&'static str>, until: Millis) -> Vec<(Millis, &'static str)> {
        let mut fired = Vec::new();
        while let Some(entry) = scheduler.pop_due(until) {
            fired.push(entry);
        }
        scheduler.advance_to(until);
        fired
    }

    #[test]
    fn tasks_fire_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(300, "check");
        scheduler.schedule(200, "clear");
        scheduler.schedule(1000, "tick");

        assert_eq!(drain(&mut scheduler, 500), [(200, "clear"), (300, "check")]);
        assert_eq!(scheduler.now(), 500);
        assert_eq!(scheduler.next_due(), Some(1000));
    }

    #[test]
    fn same_instant_keeps_scheduling_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100, "first");
        scheduler.schedule(100, "second");

        assert_eq!(drain(&mut scheduler, 100), [(100, "first"), (100, "second")]);
    }

    #[test]
    fn delays_are_relative_to_clock() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(750);

        assert_eq!(scheduler.schedule(300, "later"), 1050);
        assert!(drain(&mut scheduler, 1000).is_empty());
        assert_eq!(drain(&mut scheduler, 1050), [(1050, "later")]);
    }

    #[test]
    fn clear_drops_pending_work() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(10, "stale");
        scheduler.clear();

        assert!(scheduler.is_empty());
        assert!(drain(&mut scheduler, 100).is_empty());
    }

    #[test]
    fn bumped_epoch_invalidates_old_captures() {
        let mut epoch = Epoch::default();
        let captured = epoch;

        assert!(captured.is_current(epoch));
        epoch.bump();
        assert!(!captured.is_current(epoch));
    }
}
