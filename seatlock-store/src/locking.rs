use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use seatlock_core::transition::{self, Decision};
use seatlock_core::{
    CallerId, Clock, CoreError, CoreResult, Epoch, SeatId, SeatState, SeatStore, SeatView,
};

#[derive(Debug)]
struct SeatRecord {
    id: SeatId,
    state: SeatState,
}

/// Seat table with one mutex per seat.
///
/// Each operation locks exactly one seat for a single read-check-modify
/// step. No path ever holds two seat locks, so there is no lock ordering to
/// get wrong.
pub struct LockingStore {
    seats: Vec<Mutex<SeatRecord>>,
    epoch: Epoch,
}

impl LockingStore {
    pub fn new(capacity: u32, clock: Arc<dyn Clock>) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::InvalidCapacity(capacity));
        }
        let seats = (1..=capacity)
            .map(|id| Mutex::new(SeatRecord { id: SeatId(id), state: SeatState::Available }))
            .collect();
        Ok(Self { seats, epoch: Epoch::start(clock) })
    }

    /// Run `decide` against one seat while holding its lock.
    fn apply(&self, seat: SeatId, decide: impl FnOnce(SeatState) -> Decision) -> bool {
        let Some(slot) = seat.index(self.capacity()).and_then(|index| self.seats.get(index)) else {
            return false;
        };
        // A panic can't leave a record half-written, so a poisoned lock is still usable.
        let mut record = slot.lock().unwrap_or_else(PoisonError::into_inner);
        match decide(record.state) {
            Decision::Write { next, accepted } => {
                record.state = next;
                accepted
            }
            Decision::Keep { accepted } => accepted,
        }
    }
}

impl SeatStore for LockingStore {
    fn name(&self) -> &'static str {
        "locking"
    }

    fn capacity(&self) -> u32 {
        self.seats.len() as u32
    }

    fn hold(&self, seat: SeatId, caller: CallerId, ttl: Duration) -> bool {
        self.apply(seat, |state| match self.epoch.now() {
            Some(now) => transition::hold_for(state, caller, ttl, now),
            None => Decision::Keep { accepted: false },
        })
    }

    fn confirm(&self, seat: SeatId, caller: CallerId) -> bool {
        self.apply(seat, |state| match self.epoch.now() {
            Some(now) => transition::confirm(state, caller, now),
            None => Decision::Keep { accepted: false },
        })
    }

    fn release(&self, seat: SeatId) -> bool {
        self.apply(seat, transition::release)
    }

    fn expire(&self, seat: SeatId) -> bool {
        self.apply(seat, |state| match self.epoch.now() {
            Some(now) => transition::expire(state, now),
            None => Decision::Keep { accepted: false },
        })
    }

    fn snapshot(&self) -> Vec<SeatView> {
        self.seats
            .iter()
            .map(|slot| {
                let record = slot.lock().unwrap_or_else(PoisonError::into_inner);
                SeatView::new(record.id, &record.state)
            })
            .collect()
    }
}
