//! Timer driver background task
//!
//! Owns the controller and puts intents and scheduler wakeups on a single
//! timeline, so nothing else ever touches timer state.

use rand::Rng;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use tracing::{debug, info};

use crate::{
    scheduler::RuntimeScheduler,
    state::{Intent, TimerCommand, TimerSnapshot},
    timer::TimerController,
};

/// Capacity of the intent channel
const COMMAND_BUFFER: usize = 32;

/// Spawn the driver and hand back the intent sender and snapshot receiver
pub fn spawn_timer_driver<R>(
    controller: TimerController<RuntimeScheduler, R>,
) -> (
    mpsc::Sender<TimerCommand>,
    watch::Receiver<TimerSnapshot>,
    JoinHandle<()>,
)
where
    R: Rng + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let snapshot_rx = controller.subscribe();
    let handle = tokio::spawn(timer_driver_task(controller, command_rx));
    (command_tx, snapshot_rx, handle)
}

/// Run the controller until a shutdown intent arrives or every sender is gone
pub async fn timer_driver_task<R: Rng>(
    mut controller: TimerController<RuntimeScheduler, R>,
    mut commands: mpsc::Receiver<TimerCommand>,
) {
    info!("Starting timer driver task");

    loop {
        let deadline = controller.scheduler().next_deadline();

        tokio::select! {
            command = commands.recv() => {
                let Some(TimerCommand { intent, reply }) = command else {
                    info!("Intent channel closed, stopping timer driver");
                    break;
                };

                let shutdown = intent == Intent::Shutdown;
                apply_intent(&mut controller, intent);

                if let Some(reply) = reply {
                    if reply.send(controller.snapshot()).is_err() {
                        debug!("Intent sender went away before the reply");
                    }
                }
                if shutdown {
                    break;
                }
            }

            _ = wait_for_deadline(deadline) => {
                let mut delivered = 0;
                while let Some(handle) = controller.scheduler_mut().take_due() {
                    controller.fire(handle);
                    delivered += 1;
                }
                if delivered == 0 {
                    debug!("Woke up for a deadline with nothing due");
                }
            }
        }
    }

    controller.teardown();
    info!("Timer driver stopped");
}

fn apply_intent<R: Rng>(controller: &mut TimerController<RuntimeScheduler, R>, intent: Intent) {
    match intent {
        Intent::Start(Some(patch)) => {
            let config = patch.apply(controller.config());
            controller.start_with(config);
        }
        Intent::Start(None) => controller.start(),
        Intent::Stop => controller.stop(),
        Intent::TogglePause => controller.toggle_pause(),
        Intent::Configure(patch) => {
            let config = patch.apply(controller.config());
            controller.configure(config);
        }
        Intent::Shutdown => controller.teardown(),
    }
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        notify::{Cue, RecordingSink},
        state::{Phase, TimerConfig},
    };

    fn spawn(
        config: TimerConfig,
    ) -> (
        mpsc::Sender<TimerCommand>,
        watch::Receiver<TimerSnapshot>,
        JoinHandle<()>,
        Arc<RecordingSink>,
    ) {
        let sink = Arc::new(RecordingSink::new());
        let controller =
            TimerController::with_seed(config, RuntimeScheduler::new(), sink.clone(), Some(11));
        let (tx, rx, handle) = spawn_timer_driver(controller);
        (tx, rx, handle, sink)
    }

    async fn send(tx: &mpsc::Sender<TimerCommand>, intent: Intent) -> TimerSnapshot {
        let (command, reply) = TimerCommand::new(intent);
        tx.send(command).await.expect("driver alive");
        reply.await.expect("reply")
    }

    #[tokio::test(start_paused = true)]
    async fn runs_to_completion_on_tokio_clock() {
        let (tx, mut rx, _handle, sink) = spawn(TimerConfig::new(1_000, 0));

        let snapshot = send(&tx, Intent::Start(None)).await;
        assert_eq!(snapshot.phase, Phase::Counting);
        assert_eq!(snapshot.remaining_ms, 1_000);

        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.phase == Phase::Idle))
            .await
            .expect("finished in time")
            .expect("sender alive");

        assert_eq!(sink.count(Cue::Final), 1);
        assert_eq!(sink.count(Cue::Pulse), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_remaining_on_tokio_clock() {
        let (tx, mut rx, _handle, _sink) = spawn(TimerConfig::new(10_000, 0));
        send(&tx, Intent::Start(None)).await;

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        let paused = send(&tx, Intent::TogglePause).await;
        assert!(paused.paused);
        assert!(paused.remaining_ms >= 7_000 && paused.remaining_ms <= 7_050);

        tokio::time::sleep(Duration::from_millis(4_000)).await;
        assert_eq!(rx.borrow().remaining_ms, paused.remaining_ms);

        let resumed_at = Instant::now();
        let resumed = send(&tx, Intent::TogglePause).await;
        assert!(!resumed.paused);
        assert_eq!(resumed.remaining_ms, paused.remaining_ms);

        tokio::time::timeout(Duration::from_secs(30), rx.wait_for(|s| s.phase == Phase::Idle))
            .await
            .expect("finished in time")
            .expect("sender alive");
        assert!(resumed_at.elapsed() >= Duration::from_millis(paused.remaining_ms));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_tears_down_and_exits() {
        let (tx, _rx, handle, sink) = spawn(TimerConfig::new(1_000, 0));
        send(&tx, Intent::Start(None)).await;

        let snapshot = send(&tx, Intent::Shutdown).await;
        assert_eq!(snapshot.phase, Phase::Idle);
        handle.await.expect("driver exits cleanly");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sink.count(Cue::Final), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_senders_stops_driver() {
        let (tx, _rx, handle, _sink) = spawn(TimerConfig::new(1_000, 0));
        drop(tx);
        handle.await.expect("driver exits cleanly");
    }
}
