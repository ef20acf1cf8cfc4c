//! Seat state machine as pure functions.
//!
//! Each function looks at the current state of one seat and decides what, if
//! anything, should be written back. The lock-based store applies the
//! decision under the seat's mutex; the lock-free store turns it into a CAS.
//! Expired holds are settled to Available before any decision is made.

use std::time::Duration;

use crate::ids::CallerId;
use crate::seat::{SeatState, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Store `next`, then report `accepted` to the caller.
    Write { next: SeatState, accepted: bool },
    /// Leave the seat untouched.
    Keep { accepted: bool },
}

impl Decision {
    pub fn accepted(&self) -> bool {
        match self {
            Decision::Write { accepted, .. } | Decision::Keep { accepted } => *accepted,
        }
    }

    /// Refusal that still writes back a lazily expired hold.
    fn refuse(current: SeatState, settled: SeatState) -> Decision {
        if settled != current {
            Decision::Write { next: settled, accepted: false }
        } else {
            Decision::Keep { accepted: false }
        }
    }
}

/// Available (or expired) -> Held by `caller` until `deadline`.
pub fn hold(current: SeatState, caller: CallerId, deadline: Tick, now: Tick) -> Decision {
    match current.settle(now) {
        SeatState::Available => Decision::Write {
            next: SeatState::Held { owner: caller, deadline },
            accepted: true,
        },
        _ => Decision::Keep { accepted: false },
    }
}

/// `hold` with the deadline `ttl` after `now`. A deadline past the tick range
/// is refused outright.
pub fn hold_for(current: SeatState, caller: CallerId, ttl: Duration, now: Tick) -> Decision {
    match now.after(ttl) {
        Some(deadline) => hold(current, caller, deadline, now),
        None => Decision::Keep { accepted: false },
    }
}

/// Held by `caller` and not expired -> Sold. An expired hold is reverted to
/// Available even though the confirm fails.
pub fn confirm(current: SeatState, caller: CallerId, now: Tick) -> Decision {
    let settled = current.settle(now);
    match settled {
        SeatState::Held { owner, .. } if owner == caller => Decision::Write {
            next: SeatState::Sold { owner },
            accepted: true,
        },
        _ => Decision::refuse(current, settled),
    }
}

/// Anything but Sold -> Available. Releasing an Available seat is a no-op success.
pub fn release(current: SeatState) -> Decision {
    match current {
        SeatState::Available => Decision::Keep { accepted: true },
        SeatState::Held { .. } => Decision::Write { next: SeatState::Available, accepted: true },
        SeatState::Sold { .. } => Decision::Keep { accepted: false },
    }
}

/// Sweeper step: expired hold -> Available. Accepted only if a seat was reclaimed.
pub fn expire(current: SeatState, now: Tick) -> Decision {
    if current.is_expired(now) {
        Decision::Write { next: SeatState::Available, accepted: true }
    } else {
        Decision::Keep { accepted: false }
    }
}
