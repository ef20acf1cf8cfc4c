use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use seatlock_core::{SeatId, SeatStore};

use crate::{EngineError, EngineResult};

/// One pass over the whole pool. Returns how many expired holds were reclaimed.
///
/// The capacity is read once up front and each seat goes through the
/// store's ordinary `expire` transition, one seat at a time.
pub fn sweep_once(store: &dyn SeatStore) -> usize {
    let capacity = store.capacity();
    (1..=capacity).filter(|&id| store.expire(SeatId(id))).count()
}

/// Background task that reclaims expired holds on a fixed interval.
pub struct ExpirySweeper {
    store: Arc<dyn SeatStore>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(store: Arc<dyn SeatStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Spawn the sweep loop on the current tokio runtime.
    pub fn spawn(self) -> EngineResult<SweeperHandle> {
        if self.interval.is_zero() {
            return Err(EngineError::InvalidConfig("sweep interval must be positive".into()));
        }
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = runtime.spawn(self.run(stop_rx));

        Ok(SweeperHandle { stop: stop_tx, task: Some(task) })
    }

    async fn run(self, mut stop: watch::Receiver<bool>) {
        info!(
            backend = self.store.name(),
            seats = self.store.capacity(),
            interval_ms = self.interval.as_millis() as u64,
            "Expiry sweeper started"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // A pass over a large pool is CPU-bound; keep it off the async workers.
                    let store = self.store.clone();
                    match task::spawn_blocking(move || sweep_once(store.as_ref())).await {
                        Ok(0) => {}
                        Ok(reclaimed) => debug!(reclaimed, "Expired holds reclaimed"),
                        Err(e) => warn!(error = %e, "Sweep pass failed"),
                    }
                }
                changed = stop.changed() => {
                    // A dropped sender means nobody can stop us any more; exit too.
                    let stopped = changed.is_err() || *stop.borrow();
                    if stopped {
                        break;
                    }
                }
            }
        }

        info!(backend = self.store.name(), "Expiry sweeper stopped");
    }
}

/// Control handle for a running sweeper.
///
/// `shutdown` stops the task and waits for it. Dropping the handle only
/// signals the stop.
pub struct SweeperHandle {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub async fn shutdown(mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Expiry sweeper ended abnormally");
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}
