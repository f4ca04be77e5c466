use foundation::time::Time;

use crate::timer::{TimerId, TimerQueue};

/// Trailing-edge debouncer over a logical clock.
///
/// Each `schedule` cancels the pending value (if any) and arms a fresh timer,
/// so at most one value is pending at a time and only the latest of a burst
/// is ever delivered.
#[derive(Debug)]
pub struct Debouncer<T> {
    window_ms: u64,
    timers: TimerQueue<T>,
    pending: Option<TimerId>,
}

impl<T> Debouncer<T> {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            timers: TimerQueue::new(),
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes deliverable.
    pub fn due_at(&self) -> Option<Time> {
        self.timers.next_due()
    }

    /// Schedules `value` for delivery at `now + window`.
    ///
    /// Returns the value it superseded, if one was still pending.
    pub fn schedule(&mut self, value: T, now: Time) -> Option<T> {
        let superseded = self.cancel();
        self.pending = Some(self.timers.schedule(now.after_millis(self.window_ms), value));
        superseded
    }

    pub fn cancel(&mut self) -> Option<T> {
        let id = self.pending.take()?;
        self.timers.cancel(id)
    }

    /// Delivers the pending value once its quiescence window has elapsed.
    pub fn poll(&mut self, now: Time) -> Option<T> {
        let (id, value) = self.timers.pop_due(now)?;
        if self.pending == Some(id) {
            self.pending = None;
        }
        Some(value)
    }
}
