//! Virtual-time scheduler for simulations and tests

use super::{Scheduler, TaskHandle, TimerQueue};

/// Scheduler whose clock only moves when told to
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now_ms: u64,
    queue: TimerQueue,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of armed wakeups
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Move the clock to the next wakeup due at or before `target_ms` and
    /// return it. Returns `None` once nothing else is due in that window.
    pub fn next_wakeup_until(&mut self, target_ms: u64) -> Option<TaskHandle> {
        let due = self.queue.next_due_ms()?;
        if due > target_ms {
            return None;
        }
        self.now_ms = self.now_ms.max(due);
        self.queue.pop_due(self.now_ms).map(|(handle, _)| handle)
    }

    /// Jump the clock forward without delivering anything
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

impl Scheduler for ManualScheduler {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn schedule_periodic(&mut self, interval_ms: u64) -> TaskHandle {
        self.queue.push_periodic(self.now_ms, interval_ms)
    }

    fn schedule_once(&mut self, delay_ms: u64) -> TaskHandle {
        self.queue.push_once(self.now_ms, delay_ms)
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.queue.cancel(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_follows_delivered_wakeups() {
        let mut scheduler = ManualScheduler::new();
        let once = scheduler.schedule_once(120);
        let tick = scheduler.schedule_periodic(50);

        assert_eq!(scheduler.next_wakeup_until(200), Some(tick));
        assert_eq!(scheduler.now_ms(), 50);
        assert_eq!(scheduler.next_wakeup_until(200), Some(tick));
        assert_eq!(scheduler.next_wakeup_until(200), Some(once));
        assert_eq!(scheduler.now_ms(), 120);
        assert_eq!(scheduler.next_wakeup_until(200), Some(tick));
        assert_eq!(scheduler.now_ms(), 150);
        assert_eq!(scheduler.next_wakeup_until(199), None);
    }

    #[test]
    fn set_now_never_goes_backwards() {
        let mut scheduler = ManualScheduler::new();
        scheduler.set_now(500);
        scheduler.set_now(100);
        assert_eq!(scheduler.now_ms(), 500);
    }
}
