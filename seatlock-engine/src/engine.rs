use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use seatlock_core::{
    CallerId, CallerRegistry, Clock, SeatId, SeatStatus, SeatStore, SeatView, SystemClock, Tick,
};
use seatlock_store::app_config::EngineSettings;
use seatlock_store::Backend;

use crate::sweeper::{sweep_once, ExpirySweeper, SweeperHandle};
use crate::{EngineError, EngineResult};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub total_seats: u32,
    pub backend: Backend,
    pub sweep_interval: Duration,
}

impl EngineConfig {
    pub fn new(total_seats: u32, backend: Backend) -> Self {
        Self {
            total_seats,
            backend,
            sweep_interval: Duration::from_secs(1),
        }
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    fn validate(&self) -> EngineResult<()> {
        if self.total_seats == 0 {
            return Err(EngineError::InvalidConfig("total_seats must be positive".into()));
        }
        if self.sweep_interval.is_zero() {
            return Err(EngineError::InvalidConfig("sweep_interval must be positive".into()));
        }
        Ok(())
    }
}

impl From<&EngineSettings> for EngineConfig {
    fn from(settings: &EngineSettings) -> Self {
        EngineConfig::new(settings.total_seats, settings.backend)
            .with_sweep_interval(settings.sweep_interval())
    }
}

/// Seat totals by status, as of one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeatCounts {
    pub available: usize,
    pub held: usize,
    pub sold: usize,
}

impl SeatCounts {
    pub fn tally(views: &[SeatView]) -> Self {
        views.iter().fold(SeatCounts::default(), |mut counts, view| {
            match view.status {
                SeatStatus::Available => counts.available += 1,
                SeatStatus::Held => counts.held += 1,
                SeatStatus::Sold => counts.sold += 1,
            }
            counts
        })
    }
}

/// Facade over whichever seat store was picked at construction.
///
/// All methods take `&self` and are safe to call from any number of threads.
pub struct SeatEngine {
    store: Arc<dyn SeatStore>,
    backend: Backend,
    callers: CallerRegistry,
    sweep_interval: Duration,
}

impl SeatEngine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> EngineResult<Self> {
        config.validate()?;
        let store = config.backend.build(config.total_seats, clock)?;
        info!(seats = config.total_seats, backend = %config.backend, "Seat engine initialised");

        Ok(Self {
            store,
            backend: config.backend,
            callers: CallerRegistry::new(),
            sweep_interval: config.sweep_interval,
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn capacity(&self) -> u32 {
        self.store.capacity()
    }

    /// Available (or expired hold) -> Held by `caller` for `ttl`.
    pub fn hold(&self, seat: SeatId, caller: CallerId, ttl: Duration) -> bool {
        self.store.hold(seat, caller, ttl)
    }

    /// Held by `caller` -> Sold, provided the hold is still live.
    pub fn confirm(&self, seat: SeatId, caller: CallerId) -> bool {
        self.store.confirm(seat, caller)
    }

    /// Back to Available from anything but Sold.
    pub fn release(&self, seat: SeatId) -> bool {
        self.store.release(seat)
    }

    pub fn snapshot(&self) -> Vec<SeatView> {
        self.store.snapshot()
    }

    pub fn stats(&self) -> SeatCounts {
        SeatCounts::tally(&self.snapshot())
    }

    /// Longest ttl a hold can be given at all.
    pub fn max_hold(&self) -> Duration {
        Duration::from_millis(Tick::MAX)
    }

    /// Lost write races so far. Always zero for the locking backend.
    pub fn contention(&self) -> u64 {
        self.store.contention()
    }

    /// Numeric id for a caller name, registering it if new.
    ///
    /// Registered ids never equal a raw [`CallerId::new`] id.
    pub fn caller(&self, name: &str) -> EngineResult<CallerId> {
        Ok(self.callers.resolve(name)?)
    }

    pub fn caller_name(&self, id: CallerId) -> Option<String> {
        self.callers.name_of(id)
    }

    /// `hold` by name. A name seen for the first time is only registered if
    /// its hold goes through, so refused holds never use up ids.
    pub fn hold_for(&self, seat: SeatId, name: &str, ttl: Duration) -> EngineResult<bool> {
        if seat.index(self.capacity()).is_none() {
            return Ok(false);
        }
        Ok(self.callers.resolve_with(name, |caller| self.hold(seat, caller, ttl))?)
    }

    pub fn confirm_for(&self, seat: SeatId, name: &str) -> bool {
        // An unknown name can't be holding anything.
        match self.callers.lookup(name) {
            Some(caller) => self.confirm(seat, caller),
            None => false,
        }
    }

    /// Run one expiry pass on the calling thread.
    pub fn sweep_now(&self) -> usize {
        sweep_once(self.store.as_ref())
    }

    /// Start the background sweeper on the current tokio runtime.
    pub fn start_sweeper(&self) -> EngineResult<SweeperHandle> {
        ExpirySweeper::new(self.store.clone(), self.sweep_interval).spawn()
    }
}
