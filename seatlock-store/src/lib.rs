pub mod app_config;
pub mod atomic;
pub mod locking;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use seatlock_core::{Clock, CoreResult, SeatStore};

pub use atomic::AtomicStore;
pub use locking::LockingStore;

/// Which concurrency strategy backs the seat table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Per-seat mutex around a mutable record.
    #[default]
    Locking,
    /// Per-seat packed word updated by CAS.
    Atomic,
}

impl Backend {
    pub fn build(self, capacity: u32, clock: Arc<dyn Clock>) -> CoreResult<Arc<dyn SeatStore>> {
        let store: Arc<dyn SeatStore> = match self {
            Backend::Locking => Arc::new(LockingStore::new(capacity, clock)?),
            Backend::Atomic => Arc::new(AtomicStore::new(capacity, clock)?),
        };
        Ok(store)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Locking => "locking",
            Backend::Atomic => "atomic",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
