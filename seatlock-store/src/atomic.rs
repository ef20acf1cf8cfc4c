use std::hint;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use seatlock_core::transition::{self, Decision};
use seatlock_core::{
    CallerId, Clock, CoreError, CoreResult, Epoch, SeatId, SeatState, SeatStore, SeatView, SeatWord,
};

/// Lock-free seat table.
///
/// Every seat is one `AtomicU64` holding status, owner and hold deadline
/// (see [`SeatWord`]), so a single compare-and-swap moves all three at once.
pub struct AtomicStore {
    seats: Box<[AtomicU64]>,
    epoch: Epoch,
    cas_retries: AtomicU64,
}

impl AtomicStore {
    pub fn new(capacity: u32, clock: Arc<dyn Clock>) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::InvalidCapacity(capacity));
        }
        let seats = (0..capacity).map(|_| AtomicU64::new(SeatWord::AVAILABLE.0)).collect();
        Ok(Self {
            seats,
            epoch: Epoch::start(clock),
            cas_retries: AtomicU64::new(0),
        })
    }

    /// CAS attempts lost to a concurrent writer since construction.
    pub fn cas_retries(&self) -> u64 {
        self.cas_retries.load(Ordering::Relaxed)
    }

    /// CAS retry loop around one seat word.
    ///
    /// `decide` sees a freshly loaded and decoded state on every iteration. A
    /// `Keep` ends the loop immediately; only a lost CAS loops again.
    fn transact(&self, seat: SeatId, mut decide: impl FnMut(SeatState) -> Decision) -> bool {
        let Some(cell) = seat.index(self.capacity()).and_then(|index| self.seats.get(index)) else {
            return false;
        };

        loop {
            let current = cell.load(Ordering::Acquire);
            let state = match SeatWord(current).decode() {
                Ok(state) => state,
                Err(e) => {
                    error!(seat = %seat, error = %e, "refusing transition on corrupt seat word");
                    return false;
                }
            };

            let (next, accepted) = match decide(state) {
                Decision::Keep { accepted } => return accepted,
                Decision::Write { next, accepted } => (next, accepted),
            };

            let desired = SeatWord::encode(next).0;
            if cell
                .compare_exchange_weak(current, desired, Ordering::Release, Ordering::Relaxed)
                .is_ok()
            {
                return accepted;
            }
            self.cas_retries.fetch_add(1, Ordering::Relaxed);
            hint::spin_loop();
        }
    }
}

impl SeatStore for AtomicStore {
    fn name(&self) -> &'static str {
        "atomic"
    }

    fn capacity(&self) -> u32 {
        self.seats.len() as u32
    }

    fn hold(&self, seat: SeatId, caller: CallerId, ttl: Duration) -> bool {
        self.transact(seat, |state| match self.epoch.now() {
            Some(now) => transition::hold_for(state, caller, ttl, now),
            None => Decision::Keep { accepted: false },
        })
    }

    fn confirm(&self, seat: SeatId, caller: CallerId) -> bool {
        self.transact(seat, |state| match self.epoch.now() {
            Some(now) => transition::confirm(state, caller, now),
            None => Decision::Keep { accepted: false },
        })
    }

    /// Never a blind store: a confirm landing between our load and our write
    /// makes the CAS fail, and the retry then sees Sold and refuses.
    fn release(&self, seat: SeatId) -> bool {
        self.transact(seat, transition::release)
    }

    fn expire(&self, seat: SeatId) -> bool {
        self.transact(seat, |state| match self.epoch.now() {
            Some(now) => transition::expire(state, now),
            None => Decision::Keep { accepted: false },
        })
    }

    fn contention(&self) -> u64 {
        self.cas_retries()
    }

    fn snapshot(&self) -> Vec<SeatView> {
        self.seats
            .iter()
            .zip(1..)
            .map(|(cell, id)| {
                let seat = SeatId(id);
                let word = SeatWord(cell.load(Ordering::Acquire));
                let state = word.decode().unwrap_or_else(|e| {
                    error!(seat = %seat, error = %e, "corrupt seat word in snapshot");
                    SeatState::Available
                });
                SeatView::new(seat, &state)
            })
            .collect()
    }
}
