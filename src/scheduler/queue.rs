//! Deadline queue shared by the manual and runtime schedulers

use super::TaskHandle;

#[derive(Debug, Clone)]
struct Entry {
    handle: TaskHandle,
    due_ms: u64,
    period_ms: Option<u64>,
}

/// Pending wakeups ordered by due time, ties broken by creation order
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    entries: Vec<Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_once(&mut self, now_ms: u64, delay_ms: u64) -> TaskHandle {
        self.push(now_ms.saturating_add(delay_ms), None)
    }

    /// A zero interval is bumped to 1ms so a periodic entry always moves forward.
    pub fn push_periodic(&mut self, now_ms: u64, interval_ms: u64) -> TaskHandle {
        let period = interval_ms.max(1);
        self.push(now_ms.saturating_add(period), Some(period))
    }

    fn push(&mut self, due_ms: u64, period_ms: Option<u64>) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle::new(self.next_id);
        self.entries.push(Entry {
            handle,
            due_ms,
            period_ms,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest due time across all entries
    pub fn next_due_ms(&self) -> Option<u64> {
        self.earliest().map(|index| self.entries[index].due_ms)
    }

    /// Take the earliest entry due at or before `now_ms`.
    ///
    /// One-shot entries are removed. Periodic entries are re-armed one period
    /// later; deadlines already behind `now_ms` are skipped, not replayed.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TaskHandle, u64)> {
        let index = self.earliest()?;
        let entry = &mut self.entries[index];
        if entry.due_ms > now_ms {
            return None;
        }

        let handle = entry.handle;
        let due_ms = entry.due_ms;
        match entry.period_ms {
            Some(period) => {
                let mut next = due_ms.saturating_add(period);
                while next <= now_ms {
                    next = next.saturating_add(period);
                }
                entry.due_ms = next;
            }
            None => {
                self.entries.remove(index);
            }
        }
        Some((handle, due_ms))
    }

    fn earliest(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(_, entry)| (entry.due_ms, entry.handle))
            .map(|(index, _)| index)
    }
}
