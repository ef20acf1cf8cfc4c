use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, CoreResult};

/// Seat identity. Valid ids run from 1 to the pool capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(pub u32);

impl SeatId {
    /// Zero-based slot in a table of `capacity` seats, if the id is in range.
    pub fn index(self, capacity: u32) -> Option<usize> {
        if self.0 == 0 || self.0 > capacity {
            None
        } else {
            Some((self.0 - 1) as usize)
        }
    }
}

impl From<u32> for SeatId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric caller identity.
///
/// Bounded by the owner field of the packed seat word, so every `CallerId`
/// fits either backend without truncation. Zero is reserved for "no owner".
///
/// The top bit of the field splits the space in two. Raw ids from
/// [`CallerId::new`] live below it; ids issued by
/// [`CallerRegistry`](crate::CallerRegistry) have it set, so a registered
/// name can never own a raw caller's seat or the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u32")]
pub struct CallerId(u32);

impl CallerId {
    pub const BITS: u32 = 24;
    pub const MAX: u32 = (1 << Self::BITS) - 1;
    /// Set on every registry-issued id.
    pub const REGISTERED: u32 = 1 << (Self::BITS - 1);
    /// Largest raw id, and the number of names a registry can hold.
    pub const RAW_MAX: u32 = Self::REGISTERED - 1;

    /// Raw numeric caller, `1..=RAW_MAX`.
    pub fn new(raw: u32) -> CoreResult<Self> {
        if raw == 0 || raw > Self::RAW_MAX {
            return Err(CoreError::CallerOutOfRange(raw));
        }
        Ok(Self(raw))
    }

    /// The `seq`-th registered name, counting from 1.
    pub(crate) fn registered(seq: u32) -> CoreResult<Self> {
        if seq == 0 || seq > Self::RAW_MAX {
            return Err(CoreError::CallerSpaceExhausted(seq.saturating_sub(1)));
        }
        Ok(Self(Self::REGISTERED | seq))
    }

    /// Any owner value the seat word can carry.
    pub(crate) fn from_owner_bits(bits: u32) -> CoreResult<Self> {
        if bits == 0 || bits > Self::MAX {
            return Err(CoreError::CallerOutOfRange(bits));
        }
        Ok(Self(bits))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_registered(self) -> bool {
        self.0 & Self::REGISTERED != 0
    }

    /// Registration order for registry ids.
    pub(crate) fn sequence(self) -> Option<u32> {
        self.is_registered().then_some(self.0 & Self::RAW_MAX)
    }
}

impl From<CallerId> for u32 {
    fn from(value: CallerId) -> Self {
        value.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
