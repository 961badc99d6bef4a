//! Cancelable one-shot timers on a virtual timeline.
//!
//! Deadlines are offsets from the controller's start. Due timers come out in
//! deadline order, ties in scheduling order.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use quiz_core::model::CardId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Flip(CardId),
    CountdownTick(CardId),
    AutoClose(CardId),
}

impl TimerKind {
    #[must_use]
    pub fn card_id(self) -> CardId {
        match self {
            TimerKind::Flip(id) | TimerKind::CountdownTick(id) | TimerKind::AutoClose(id) => id,
        }
    }
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    queue: BTreeMap<(Duration, TimerHandle), TimerKind>,
    deadlines: HashMap<TimerHandle, Duration>,
    next_handle: u64,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Duration, kind: TimerKind) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.queue.insert((deadline, handle), kind);
        self.deadlines.insert(handle, deadline);
        handle
    }

    /// Returns `false` if the timer already fired or was canceled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle) {
            Some(deadline) => self.queue.remove(&(deadline, handle)).is_some(),
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Removes and returns the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, TimerHandle, TimerKind)> {
        let (&(deadline, handle), _) = self.queue.first_key_value()?;
        if deadline > now {
            return None;
        }
        let kind = self.queue.remove(&(deadline, handle))?;
        self.deadlines.remove(&handle);
        Some((deadline, handle, kind))
    }
}
