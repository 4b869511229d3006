//! Countdown → random wait → notify state machine
//!
//! ```text
//! Idle --start--> Counting --remaining hits 0--> Waiting --one-shot--> Idle
//!                  |  ^                            |
//!            pause |  | resume                     |
//!                  v  |                            |
//!               Counting(paused)                   |
//!  (stop from any phase goes straight to Idle) <---+
//! ```
//!
//! The periodic tick handle only exists inside [`Motion::Running`] and the
//! one-shot handle only inside [`Waiting`], so the two can never be armed at
//! the same time and neither is armed while idle.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    notify::{Cue, NotificationSink},
    scheduler::{ManualScheduler, Scheduler, TaskHandle},
    state::{Phase, TimerConfig, TimerSnapshot},
    utils::duration_input::seconds_left,
};

/// Default refresh cadence while counting down
pub const DEFAULT_TICK_MS: u64 = 50;

#[derive(Debug, Clone, Copy)]
enum Motion {
    Running {
        tick: TaskHandle,
        /// Clock reading the current baseline was taken at
        since_ms: u64,
        /// Remaining time at `since_ms`
        baseline_ms: u64,
    },
    Paused {
        remaining_at_pause: u64,
    },
}

#[derive(Debug, Clone, Copy)]
struct Counting {
    run: TimerConfig,
    remaining_ms: u64,
    last_second: u64,
    motion: Motion,
}

#[derive(Debug, Clone, Copy)]
struct Waiting {
    run: TimerConfig,
    wakeup: TaskHandle,
}

#[derive(Debug, Clone, Copy)]
enum RunState {
    Idle,
    Counting(Counting),
    Waiting(Waiting),
}

/// Draw the post-countdown delay uniformly from `0..=max_wait_ms`.
/// A zero maximum yields zero without touching the generator.
pub fn draw_wait_delay<R: Rng + ?Sized>(rng: &mut R, max_wait_ms: u64) -> u64 {
    if max_wait_ms == 0 {
        0
    } else {
        rng.gen_range(0..=max_wait_ms)
    }
}

/// `1 - remaining/countdown` clamped to `[0, 1]`; zero for an empty countdown
pub fn progress_fraction(remaining_ms: u64, countdown_ms: u64) -> f64 {
    if countdown_ms == 0 {
        return 0.0;
    }
    (1.0 - remaining_ms as f64 / countdown_ms as f64).clamp(0.0, 1.0)
}

/// Owns all timing state for a single timer
pub struct TimerController<S: Scheduler, R: Rng = Mcg128Xsl64> {
    scheduler: S,
    rng: R,
    sink: Arc<dyn NotificationSink>,
    config: TimerConfig,
    tick_interval_ms: u64,
    state: RunState,
    last_wait_delay_ms: Option<u64>,
    completed_runs: u64,
    snapshot_tx: watch::Sender<TimerSnapshot>,
}

impl<S: Scheduler> TimerController<S, Mcg128Xsl64> {
    /// Controller with a PCG generator, seeded when `seed` is given
    pub fn with_seed(
        config: TimerConfig,
        scheduler: S,
        sink: Arc<dyn NotificationSink>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self::new(config, scheduler, sink, rng)
    }
}

impl<S: Scheduler, R: Rng> TimerController<S, R> {
    pub fn new(config: TimerConfig, scheduler: S, sink: Arc<dyn NotificationSink>, rng: R) -> Self {
        let (snapshot_tx, _) = watch::channel(TimerSnapshot::idle(config));
        Self {
            scheduler,
            rng,
            sink,
            config,
            tick_interval_ms: DEFAULT_TICK_MS,
            state: RunState::Idle,
            last_wait_delay_ms: None,
            completed_runs: 0,
            snapshot_tx,
        }
    }

    /// Override the refresh cadence. Applies from the next start or resume.
    pub fn with_tick_interval(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Receiver that sees a fresh snapshot after every tick and transition
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            RunState::Idle => Phase::Idle,
            RunState::Counting(_) => Phase::Counting,
            RunState::Waiting(_) => Phase::Waiting,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(
            self.state,
            RunState::Counting(Counting {
                motion: Motion::Paused { .. },
                ..
            })
        )
    }

    pub fn remaining_ms(&self) -> u64 {
        match self.state {
            RunState::Idle => self.config.countdown_ms,
            RunState::Counting(counting) => counting.remaining_ms,
            RunState::Waiting(_) => 0,
        }
    }

    pub fn progress(&self) -> f64 {
        match self.state {
            RunState::Idle => progress_fraction(self.config.countdown_ms, self.config.countdown_ms),
            RunState::Counting(counting) => {
                progress_fraction(counting.remaining_ms, counting.run.countdown_ms)
            }
            RunState::Waiting(waiting) => progress_fraction(0, waiting.run.countdown_ms),
        }
    }

    /// Configuration the next start will use
    pub fn config(&self) -> TimerConfig {
        self.config
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Delay drawn on the most recent entry into Waiting
    pub fn last_wait_delay_ms(&self) -> Option<u64> {
        self.last_wait_delay_ms
    }

    /// Runs that made it all the way through the wait
    pub fn completed_runs(&self) -> u64 {
        self.completed_runs
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        match self.state {
            RunState::Idle => TimerSnapshot::idle(self.config),
            RunState::Counting(counting) => TimerSnapshot {
                phase: Phase::Counting,
                paused: matches!(counting.motion, Motion::Paused { .. }),
                remaining_ms: counting.remaining_ms,
                countdown_ms: counting.run.countdown_ms,
                max_wait_ms: counting.run.max_wait_ms,
                progress: self.progress(),
                seconds_left: seconds_left(counting.remaining_ms),
            },
            RunState::Waiting(waiting) => TimerSnapshot {
                phase: Phase::Waiting,
                paused: false,
                remaining_ms: 0,
                countdown_ms: waiting.run.countdown_ms,
                max_wait_ms: waiting.run.max_wait_ms,
                progress: self.progress(),
                seconds_left: 0,
            },
        }
    }

    // ── Intents ──────────────────────────────────────────────────────

    /// Edit the duration fields. A running timer keeps its frozen values;
    /// an idle one shows the new countdown straight away.
    pub fn configure(&mut self, config: TimerConfig) {
        debug!(
            "Configured countdown={}ms max_wait={}ms",
            config.countdown_ms, config.max_wait_ms
        );
        self.config = config;
        if matches!(self.state, RunState::Idle) {
            self.publish();
        }
    }

    /// Begin a fresh run with the current configuration, abandoning any
    /// run in progress
    pub fn start(&mut self) {
        self.clear();

        let run = self.config;
        let now = self.scheduler.now_ms();
        let tick = self.scheduler.schedule_periodic(self.tick_interval_ms);
        self.state = RunState::Counting(Counting {
            run,
            remaining_ms: run.countdown_ms,
            last_second: seconds_left(run.countdown_ms),
            motion: Motion::Running {
                tick,
                since_ms: now,
                baseline_ms: run.countdown_ms,
            },
        });

        info!(
            "Countdown started: {}ms, then up to {}ms wait",
            run.countdown_ms, run.max_wait_ms
        );
        self.publish();
    }

    /// Configure and start in one step
    pub fn start_with(&mut self, config: TimerConfig) {
        self.config = config;
        self.start();
    }

    /// Cancel everything and return to Idle. Safe from any phase.
    pub fn stop(&mut self) {
        let previous = self.clear();
        if !matches!(previous, RunState::Idle) {
            info!("Timer stopped");
        }
        self.publish();
    }

    /// Pause a running countdown or resume a paused one. Ignored unless
    /// counting.
    pub fn toggle_pause(&mut self) {
        let phase = self.phase();
        let RunState::Counting(counting) = &mut self.state else {
            debug!("Ignoring pause toggle while {:?}", phase);
            return;
        };

        match counting.motion {
            Motion::Running { tick, .. } => {
                self.scheduler.cancel(tick);
                counting.motion = Motion::Paused {
                    remaining_at_pause: counting.remaining_ms,
                };
                info!("Countdown paused at {}ms", counting.remaining_ms);
            }
            Motion::Paused { remaining_at_pause } => {
                let now = self.scheduler.now_ms();
                let tick = self.scheduler.schedule_periodic(self.tick_interval_ms);
                counting.remaining_ms = remaining_at_pause;
                counting.motion = Motion::Running {
                    tick,
                    since_ms: now,
                    baseline_ms: remaining_at_pause,
                };
                info!("Countdown resumed at {}ms", remaining_at_pause);
            }
        }
        self.publish();
    }

    /// Host is going away: disarm everything without notifying anyone
    pub fn teardown(&mut self) {
        let previous = self.clear();
        if !matches!(previous, RunState::Idle) {
            info!("Timer torn down with pending work discarded");
        }
        self.publish();
    }

    // ── Scheduler deliveries ─────────────────────────────────────────

    /// Deliver a wakeup. Returns `false` when the handle is not one this
    /// controller currently holds, in which case nothing happens.
    pub fn fire(&mut self, handle: TaskHandle) -> bool {
        match self.state {
            RunState::Counting(Counting {
                motion: Motion::Running { tick, .. },
                ..
            }) if tick == handle => {
                self.on_tick();
                true
            }
            RunState::Waiting(waiting) if waiting.wakeup == handle => {
                self.on_wait_elapsed();
                true
            }
            _ => {
                debug!("Ignoring stale wakeup {}", handle.id());
                false
            }
        }
    }

    fn on_tick(&mut self) {
        let now = self.scheduler.now_ms();
        let RunState::Counting(counting) = &mut self.state else {
            return;
        };
        let Motion::Running {
            since_ms,
            baseline_ms,
            ..
        } = counting.motion
        else {
            return;
        };

        let elapsed = now.saturating_sub(since_ms);
        counting.remaining_ms = baseline_ms.saturating_sub(elapsed);

        let second = seconds_left(counting.remaining_ms);
        let crossed_second = second != counting.last_second;
        counting.last_second = second;
        let run = counting.run;
        let remaining = counting.remaining_ms;

        if crossed_second && second > 0 {
            debug!("{}s left", second);
            self.notify(Cue::Tick);
        }

        if remaining == 0 {
            self.enter_waiting(run);
        } else {
            self.publish();
        }
    }

    fn enter_waiting(&mut self, run: TimerConfig) {
        self.clear();

        let delay_ms = draw_wait_delay(&mut self.rng, run.max_wait_ms);
        let wakeup = self.scheduler.schedule_once(delay_ms);
        self.last_wait_delay_ms = Some(delay_ms);
        self.state = RunState::Waiting(Waiting { run, wakeup });

        info!("Countdown finished, waiting before notifying");
        debug!("Drew wait delay of {}ms (max {}ms)", delay_ms, run.max_wait_ms);
        self.publish();
    }

    fn on_wait_elapsed(&mut self) {
        self.clear();

        self.notify(Cue::Pulse);
        self.notify(Cue::Final);
        self.completed_runs += 1;

        info!("Wait elapsed, notification sent");
        self.publish();
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Disarm whatever the current state holds and drop back to Idle,
    /// handing back the state that was replaced
    fn clear(&mut self) -> RunState {
        let previous = std::mem::replace(&mut self.state, RunState::Idle);
        match previous {
            RunState::Idle => {}
            RunState::Counting(Counting {
                motion: Motion::Running { tick, .. },
                ..
            }) => self.scheduler.cancel(tick),
            RunState::Counting(_) => {}
            RunState::Waiting(waiting) => self.scheduler.cancel(waiting.wakeup),
        }
        previous
    }

    fn notify(&self, cue: Cue) {
        if let Err(e) = self.sink.emit(cue) {
            warn!("Failed to deliver {} cue: {}", cue, e);
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

impl<R: Rng> TimerController<ManualScheduler, R> {
    /// Move virtual time forward by `ms`, delivering every wakeup that comes
    /// due on the way in order
    pub fn advance(&mut self, ms: u64) {
        let target = self.scheduler.now_ms().saturating_add(ms);
        while let Some(handle) = self.scheduler.next_wakeup_until(target) {
            self.fire(handle);
        }
        self.scheduler.set_now(target);
    }
}
