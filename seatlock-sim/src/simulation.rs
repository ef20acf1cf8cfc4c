use rand::Rng;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use seatlock_engine::{SeatCounts, SeatEngine, SeatId};
use seatlock_store::app_config::SimulationSettings;

use crate::join_workers;

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub users: u32,
    pub elapsed: Duration,
    pub holds: u64,
    pub confirms: u64,
    pub counts: SeatCounts,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation complete in {:.3} seconds.", self.elapsed.as_secs_f64())?;
        writeln!(f, "Successful holds: {}, confirms: {}", self.holds, self.confirms)?;
        writeln!(f, "Final State:")?;
        writeln!(f, "  SOLD: {}", self.counts.sold)?;
        writeln!(f, "  HELD: {}", self.counts.held)?;
        write!(f, "  AVAILABLE: {}", self.counts.available)
    }
}

#[derive(Debug, Default)]
struct UserTally {
    holds: u64,
    confirms: u64,
}

/// Spin up `settings.users` threads that each hold and confirm random seats
/// under their own name, pausing `think_time_ms` between actions.
///
/// Expired holds are only reclaimed lazily here unless the caller has a
/// sweeper running for `engine`.
pub fn run_simulation(engine: &SeatEngine, settings: &SimulationSettings) -> SimulationReport {
    let capacity = engine.capacity();
    let hold = Duration::from_secs(settings.hold_seconds);
    let think = Duration::from_millis(settings.think_time_ms);

    info!(users = settings.users, seats = capacity, backend = %engine.backend(), "Starting simulation");
    let start = Instant::now();

    let tallies: Vec<UserTally> = thread::scope(|scope| {
        let workers: Vec<_> = (0..settings.users)
            .map(|user| {
                scope.spawn(move || simulate_user(engine, user, settings.ops_per_user, hold, think))
            })
            .collect();
        join_workers(workers)
    });

    let report = SimulationReport {
        users: settings.users,
        elapsed: start.elapsed(),
        holds: tallies.iter().map(|t| t.holds).sum(),
        confirms: tallies.iter().map(|t| t.confirms).sum(),
        counts: engine.stats(),
    };
    info!(elapsed_ms = report.elapsed.as_millis() as u64, "Simulation finished");
    report
}

fn simulate_user(engine: &SeatEngine, user: u32, ops: u32, hold: Duration, think: Duration) -> UserTally {
    let mut rng = rand::thread_rng();
    let name = format!("User{}", user);
    let mut tally = UserTally::default();

    for _ in 0..ops {
        let seat = SeatId(rng.gen_range(1..=engine.capacity()));
        // 4 in 6 hold, 1 in 6 confirm, 1 in 6 idle.
        match rng.gen_range(0..6) {
            0..=3 => {
                if matches!(engine.hold_for(seat, &name, hold), Ok(true)) {
                    tally.holds += 1;
                }
            }
            4 => {
                if engine.confirm_for(seat, &name) {
                    tally.confirms += 1;
                }
            }
            _ => {}
        }
        if !think.is_zero() {
            thread::sleep(think);
        }
    }

    debug!(user = %name, holds = tally.holds, confirms = tally.confirms, "User done");
    tally
}
