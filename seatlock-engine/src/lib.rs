pub mod engine;
pub mod sweeper;

pub use engine::{EngineConfig, SeatCounts, SeatEngine};
pub use sweeper::{sweep_once, ExpirySweeper, SweeperHandle};

pub use seatlock_core::{CallerId, CallerRegistry, SeatId, SeatStatus, SeatView};
pub use seatlock_store::Backend;

use seatlock_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),
    #[error("Expiry sweeper needs a running tokio runtime")]
    NoRuntime,
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
