//! Load drivers for the seat engine: a think-time user simulation and a
//! no-pause throughput stress run.

pub mod simulation;
pub mod stress;

pub use simulation::{run_simulation, SimulationReport};
pub use stress::{run_stress, StressReport};

use std::panic;
use std::thread::ScopedJoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the fmt subscriber used by the driver binaries.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.to_owned().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Join every worker, re-raising the first panic instead of reporting a
/// partial tally.
fn join_workers<T>(workers: Vec<ScopedJoinHandle<'_, T>>) -> Vec<T> {
    workers
        .into_iter()
        .map(|worker| worker.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_join_workers_collects_in_order() {
        let results = thread::scope(|scope| {
            let workers = (0..4).map(|n| scope.spawn(move || n * 10)).collect();
            join_workers(workers)
        });
        assert_eq!(results, vec![0, 10, 20, 30]);
    }

    #[test]
    #[should_panic(expected = "worker gave up")]
    fn test_join_workers_propagates_panic() {
        thread::scope(|scope| {
            let workers = vec![
                scope.spawn(|| 1),
                scope.spawn(|| -> i32 { panic!("worker gave up") }),
            ];
            join_workers(workers)
        });
    }
}
