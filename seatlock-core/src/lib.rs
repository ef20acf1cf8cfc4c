pub mod callers;
pub mod clock;
pub mod ids;
pub mod seat;
pub mod store;
pub mod transition;
pub mod word;

pub use callers::CallerRegistry;
pub use clock::{Clock, Epoch, ManualClock, SystemClock};
pub use ids::{CallerId, SeatId};
pub use seat::{SeatState, SeatStatus, SeatView, Tick};
pub use store::SeatStore;
pub use transition::Decision;
pub use word::SeatWord;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Caller id out of range: {0}")]
    CallerOutOfRange(u32),
    #[error("Caller id space exhausted after {0} callers")]
    CallerSpaceExhausted(u32),
    #[error("Corrupt seat word: {0:#018x}")]
    CorruptWord(u64),
    #[error("Invalid seat capacity: {0}")]
    InvalidCapacity(u32),
}

pub type CoreResult<T> = Result<T, CoreError>;
