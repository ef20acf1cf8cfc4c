use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ids::{CallerId, SeatId};

/// Milliseconds elapsed since a store's epoch.
///
/// Capped at 38 bits so a deadline fits the packed seat word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick(u64);

impl Tick {
    pub const BITS: u32 = 38;
    pub const MAX: u64 = (1 << Self::BITS) - 1;
    pub const ZERO: Tick = Tick(0);

    pub fn new(millis: u64) -> Option<Self> {
        (millis <= Self::MAX).then_some(Self(millis))
    }

    /// Tick for an elapsed duration, or `None` once the epoch range is exhausted.
    pub fn from_elapsed(elapsed: Duration) -> Option<Self> {
        u64::try_from(elapsed.as_millis()).ok().and_then(Self::new)
    }

    /// Deadline `ttl` after this tick; `None` if it falls outside the range.
    pub fn after(self, ttl: Duration) -> Option<Self> {
        let ttl = u64::try_from(ttl.as_millis()).ok()?;
        self.0.checked_add(ttl).and_then(Self::new)
    }

    pub fn millis(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Held,
    Sold,
}

/// Full state of one seat.
///
/// The owner only exists while Held or Sold and the deadline only while Held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeatState {
    #[default]
    Available,
    Held { owner: CallerId, deadline: Tick },
    Sold { owner: CallerId },
}

impl SeatState {
    pub fn status(&self) -> SeatStatus {
        match self {
            SeatState::Available => SeatStatus::Available,
            SeatState::Held { .. } => SeatStatus::Held,
            SeatState::Sold { .. } => SeatStatus::Sold,
        }
    }

    pub fn owner(&self) -> Option<CallerId> {
        match self {
            SeatState::Available => None,
            SeatState::Held { owner, .. } | SeatState::Sold { owner } => Some(*owner),
        }
    }

    /// True for a hold whose deadline has passed. A hold is still live at
    /// exactly its deadline tick.
    pub fn is_expired(&self, now: Tick) -> bool {
        matches!(self, SeatState::Held { deadline, .. } if now > *deadline)
    }

    /// The state as seen by a writer at `now`: an expired hold reads as Available.
    pub fn settle(self, now: Tick) -> SeatState {
        if self.is_expired(now) {
            SeatState::Available
        } else {
            self
        }
    }
}

/// One row of a seat snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatView {
    pub id: SeatId,
    pub status: SeatStatus,
    pub owner: Option<CallerId>,
}

impl SeatView {
    pub fn new(id: SeatId, state: &SeatState) -> Self {
        Self {
            id,
            status: state.status(),
            owner: state.owner(),
        }
    }
}
