use rand::Rng;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

use seatlock_engine::{CallerId, EngineResult, SeatEngine, SeatId};
use seatlock_store::app_config::SimulationSettings;

use crate::join_workers;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub holds: u64,
    pub confirms: u64,
    pub releases: u64,
}

impl OpCounts {
    fn merge(mut self, other: OpCounts) -> Self {
        self.holds += other.holds;
        self.confirms += other.confirms;
        self.releases += other.releases;
        self
    }
}

#[derive(Debug, Clone)]
pub struct StressReport {
    pub backend: &'static str,
    pub threads: u32,
    pub total_ops: u64,
    pub elapsed: Duration,
    /// Operations that returned true, by kind.
    pub succeeded: OpCounts,
    /// Writes retried after losing a race during this run.
    pub cas_retries: u64,
}

impl StressReport {
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.total_ops as f64 / secs
    }
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Benchmark Finished ({} backend, {} threads):", self.backend, self.threads)?;
        writeln!(f, "  Time: {:.3}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "  Ops/Sec: {:.0}", self.ops_per_sec())?;
        writeln!(
            f,
            "  Succeeded: {} holds, {} confirms, {} releases",
            self.succeeded.holds, self.succeeded.confirms, self.succeeded.releases
        )?;
        write!(f, "  CAS retries: {}", self.cas_retries)
    }
}

/// Hammer `engine` from `stress_threads` threads with no pauses.
///
/// Each thread picks a random seat per op: hold half the time, confirm a
/// quarter, release a quarter.
pub fn run_stress(engine: &SeatEngine, settings: &SimulationSettings) -> EngineResult<StressReport> {
    let hold = Duration::from_millis(settings.stress_hold_ms);
    let ops = settings.stress_ops_per_thread;

    let callers = (0..settings.stress_threads)
        .map(|n| engine.caller(&format!("Worker{}", n + 1)))
        .collect::<EngineResult<Vec<_>>>()?;

    info!(
        threads = settings.stress_threads,
        ops_per_thread = ops,
        seats = engine.capacity(),
        backend = %engine.backend(),
        "Starting stress run"
    );
    let retries_before = engine.contention();
    let start = Instant::now();

    let succeeded = thread::scope(|scope| {
        let workers: Vec<_> = callers
            .iter()
            .map(|&caller| scope.spawn(move || stress_worker(engine, caller, ops, hold)))
            .collect();
        join_workers(workers)
            .into_iter()
            .fold(OpCounts::default(), OpCounts::merge)
    });

    Ok(StressReport {
        backend: engine.backend().as_str(),
        threads: settings.stress_threads,
        total_ops: u64::from(settings.stress_threads) * u64::from(ops),
        elapsed: start.elapsed(),
        succeeded,
        cas_retries: engine.contention().saturating_sub(retries_before),
    })
}

fn stress_worker(engine: &SeatEngine, caller: CallerId, ops: u32, hold: Duration) -> OpCounts {
    let mut rng = rand::thread_rng();
    let capacity = engine.capacity();
    let mut counts = OpCounts::default();

    for _ in 0..ops {
        let seat = SeatId(rng.gen_range(1..=capacity));
        match rng.gen_range(0..4) {
            0 | 1 => counts.holds += u64::from(engine.hold(seat, caller, hold)),
            2 => counts.confirms += u64::from(engine.confirm(seat, caller)),
            _ => counts.releases += u64::from(engine.release(seat)),
        }
    }
    counts
}
