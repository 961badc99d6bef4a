//! Real-time driver for a shared [`CardController`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{trace, warn};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::controller::{CardController, ControllerEvent};

/// Handle to a running driver task.
#[derive(Debug)]
pub struct DriverHandle {
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Stops the driver. Pending timers stay queued on the controller.
    pub fn stop(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a task that advances `controller` by the real elapsed time every
/// `period`, passing any timer events to `on_events` outside the lock.
///
/// Must be called from within a tokio runtime.
pub fn spawn_driver<F>(
    controller: Arc<Mutex<CardController>>,
    period: Duration,
    mut on_events: F,
) -> DriverHandle
where
    F: FnMut(Vec<ControllerEvent>) + Send + 'static,
{
    let period = period.max(Duration::from_millis(1));
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        loop {
            ticker.tick().await;
            let now = Instant::now();
            let elapsed = now.duration_since(last);
            last = now;

            let events = match controller.lock() {
                Ok(mut controller) => controller.advance(elapsed),
                Err(_) => {
                    warn!("controller lock poisoned; stopping driver");
                    break;
                }
            };
            if !events.is_empty() {
                trace!("driver fired {} events", events.len());
                on_events(events);
            }
        }
    });

    DriverHandle { task }
}
