//! Tokio-clock scheduler used by the timer driver task

use tokio::time::{Duration, Instant};

use super::{Scheduler, TaskHandle, TimerQueue};

/// Scheduler backed by the tokio clock.
///
/// It does not sleep by itself: the driver asks for [`next_deadline`] and
/// calls [`take_due`] once that instant has passed.
///
/// [`next_deadline`]: RuntimeScheduler::next_deadline
/// [`take_due`]: RuntimeScheduler::take_due
#[derive(Debug)]
pub struct RuntimeScheduler {
    origin: Instant,
    queue: TimerQueue,
}

impl RuntimeScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            queue: TimerQueue::new(),
        }
    }

    /// Instant at which the earliest armed wakeup becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue
            .next_due_ms()
            .map(|due| self.origin + Duration::from_millis(due))
    }

    /// Next wakeup already due at the current tokio time
    pub fn take_due(&mut self) -> Option<TaskHandle> {
        let now = self.now_ms();
        self.queue.pop_due(now).map(|(handle, _)| handle)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Default for RuntimeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for RuntimeScheduler {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn schedule_periodic(&mut self, interval_ms: u64) -> TaskHandle {
        let now = self.now_ms();
        self.queue.push_periodic(now, interval_ms)
    }

    fn schedule_once(&mut self, delay_ms: u64) -> TaskHandle {
        let now = self.now_ms();
        self.queue.push_once(now, delay_ms)
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.queue.cancel(handle);
    }
}
