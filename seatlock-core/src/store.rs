use std::time::Duration;

use crate::ids::{CallerId, SeatId};
use crate::seat::SeatView;

/// Capability shared by every seat store backend.
///
/// Every method touches at most one seat at a time and reports failure as
/// `false`; out-of-range ids are a plain failure.
pub trait SeatStore: Send + Sync {
    /// Short backend name for logs and reports.
    fn name(&self) -> &'static str;

    /// Number of seats; ids run `1..=capacity`.
    fn capacity(&self) -> u32;

    fn hold(&self, seat: SeatId, caller: CallerId, ttl: Duration) -> bool;

    fn confirm(&self, seat: SeatId, caller: CallerId) -> bool;

    fn release(&self, seat: SeatId) -> bool;

    /// Revert `seat` to Available if it is an expired hold. Returns whether
    /// anything was reclaimed.
    fn expire(&self, seat: SeatId) -> bool;

    /// Per-seat consistent view of every seat, ascending by id.
    fn snapshot(&self) -> Vec<SeatView>;

    /// Writes that lost a race and had to be retried. Stores that serialise
    /// writers report zero.
    fn contention(&self) -> u64 {
        0
    }
}
