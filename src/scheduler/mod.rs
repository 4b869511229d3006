//! Clock and scheduling abstractions
//!
//! The controller never owns a callback. It asks a [`Scheduler`] for a
//! [`TaskHandle`] and the host delivers that handle back when it comes due.
//! Anything the controller no longer holds a handle for is dropped on the
//! floor, so a cancelled wakeup can never run.

pub mod manual;
pub mod queue;
pub mod runtime;

pub use manual::ManualScheduler;
pub use queue::TimerQueue;
pub use runtime::RuntimeScheduler;

/// Opaque identifier for one scheduled wakeup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Monotonic millisecond clock plus periodic and one-shot wakeups
pub trait Scheduler {
    /// Milliseconds since an arbitrary fixed origin. Never decreases.
    fn now_ms(&self) -> u64;

    /// Arm a wakeup every `interval_ms`, first one `interval_ms` from now
    fn schedule_periodic(&mut self, interval_ms: u64) -> TaskHandle;

    /// Arm a single wakeup `delay_ms` from now
    fn schedule_once(&mut self, delay_ms: u64) -> TaskHandle;

    /// Disarm a wakeup. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TaskHandle);
}
