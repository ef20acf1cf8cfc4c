//! Packed 64-bit seat word used by the lock-free store.
//!
//! ```text
//!  63                                26 25                  2 1  0
//! +------------------------------------+---------------------+----+
//! |  hold deadline (38 bits, ms tick)  |  owner (24 bits)    | st |
//! +------------------------------------+---------------------+----+
//! ```
//!
//! Status `00` is Available, `01` Held, `10` Sold. `11` never gets written.
//! Available is the all-zero word; Sold keeps its owner and a zero deadline.

use crate::ids::CallerId;
use crate::seat::{SeatState, Tick};
use crate::{CoreError, CoreResult};

const STATUS_BITS: u32 = 2;
const STATUS_MASK: u64 = (1 << STATUS_BITS) - 1;
const OWNER_SHIFT: u32 = STATUS_BITS;
const OWNER_MASK: u64 = (1 << CallerId::BITS) - 1;
const DEADLINE_SHIFT: u32 = OWNER_SHIFT + CallerId::BITS;

const AVAILABLE: u64 = 0b00;
const HELD: u64 = 0b01;
const SOLD: u64 = 0b10;

// The three fields must tile the word exactly.
const _: () = assert!(DEADLINE_SHIFT + Tick::BITS == u64::BITS);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SeatWord(pub u64);

impl SeatWord {
    pub const AVAILABLE: SeatWord = SeatWord(0);

    pub fn encode(state: SeatState) -> SeatWord {
        let bits = match state {
            SeatState::Available => AVAILABLE,
            SeatState::Held { owner, deadline } => {
                HELD | (u64::from(owner.get()) << OWNER_SHIFT) | (deadline.millis() << DEADLINE_SHIFT)
            }
            SeatState::Sold { owner } => SOLD | (u64::from(owner.get()) << OWNER_SHIFT),
        };
        SeatWord(bits)
    }

    pub fn decode(self) -> CoreResult<SeatState> {
        let raw = self.0;
        let owner_bits = ((raw >> OWNER_SHIFT) & OWNER_MASK) as u32;
        let deadline_bits = raw >> DEADLINE_SHIFT;
        let corrupt = || CoreError::CorruptWord(raw);

        match raw & STATUS_MASK {
            AVAILABLE if raw == 0 => Ok(SeatState::Available),
            HELD => {
                let owner = CallerId::from_owner_bits(owner_bits).map_err(|_| corrupt())?;
                let deadline = Tick::new(deadline_bits).ok_or_else(corrupt)?;
                Ok(SeatState::Held { owner, deadline })
            }
            SOLD if deadline_bits == 0 => {
                let owner = CallerId::from_owner_bits(owner_bits).map_err(|_| corrupt())?;
                Ok(SeatState::Sold { owner })
            }
            _ => Err(corrupt()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(raw: u32) -> CallerId {
        CallerId::from_owner_bits(raw).unwrap()
    }

    #[test]
    fn test_available_is_zero_word() {
        assert_eq!(SeatWord::encode(SeatState::Available), SeatWord::AVAILABLE);
        assert_eq!(SeatWord::AVAILABLE.decode(), Ok(SeatState::Available));
    }

    #[test]
    fn test_held_word_layout() {
        let state = SeatState::Held { owner: caller(5), deadline: Tick::new(3).unwrap() };
        let word = SeatWord::encode(state);
        assert_eq!(word.0, 0b01 | (5 << 2) | (3 << 26));
        assert_eq!(word.decode(), Ok(state));
    }

    #[test]
    fn test_extreme_fields_do_not_collide() {
        let state = SeatState::Held {
            owner: caller(CallerId::MAX),
            deadline: Tick::new(Tick::MAX).unwrap(),
        };
        let word = SeatWord::encode(state);
        assert_eq!(word.0 & STATUS_MASK, HELD);
        assert_eq!(word.decode(), Ok(state));

        let sold = SeatState::Sold { owner: caller(CallerId::MAX) };
        assert_eq!(SeatWord::encode(sold).decode(), Ok(sold));
    }

    #[test]
    fn test_corrupt_words_rejected() {
        // Status 11.
        assert_eq!(SeatWord(0b11).decode(), Err(CoreError::CorruptWord(0b11)));
        // Held without an owner.
        assert_eq!(SeatWord(0b01).decode(), Err(CoreError::CorruptWord(0b01)));
        // Available with stray owner bits.
        let stray = 1 << OWNER_SHIFT;
        assert_eq!(SeatWord(stray).decode(), Err(CoreError::CorruptWord(stray)));
        // Sold carrying a deadline.
        let sold_with_deadline = SOLD | (1 << OWNER_SHIFT) | (1 << DEADLINE_SHIFT);
        assert!(SeatWord(sold_with_deadline).decode().is_err());
    }
}
