use std::sync::Arc;
use std::time::Duration;

use seatlock_engine::SeatEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SeatEngine>,
    /// Used when a hold request leaves out `ttl_seconds`.
    pub default_hold: Duration,
}

impl AppState {
    pub fn new(engine: Arc<SeatEngine>, default_hold: Duration) -> Self {
        Self { engine, default_hold }
    }
}
