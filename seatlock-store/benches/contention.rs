//! Lock-based vs lock-free seat stores under contention.
//!
//! Run with: `cargo bench -p seatlock-store`

#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seatlock_core::{CallerId, SeatId, SeatStore, SystemClock};
use seatlock_store::Backend;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const SEATS: u32 = 1_000;
const OPS_PER_THREAD: u32 = 10_000;

fn hammer(store: &dyn SeatStore, threads: u32) {
    thread::scope(|scope| {
        for t in 1..=threads {
            scope.spawn(move || {
                let caller = CallerId::new(t).unwrap();
                // Seeded per thread so every run replays the same workload.
                let mut rng = StdRng::seed_from_u64(u64::from(t));
                for _ in 0..OPS_PER_THREAD {
                    let seat = SeatId(rng.gen_range(1..=SEATS));
                    let ok = match rng.gen_range(0..4) {
                        0 | 1 => store.hold(seat, caller, Duration::from_millis(500)),
                        2 => store.confirm(seat, caller),
                        _ => store.release(seat),
                    };
                    black_box(ok);
                }
            });
        }
    });
}

fn bench_mixed_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_workload");
    group.sample_size(20);

    for threads in [1_u32, 4, 16] {
        group.throughput(Throughput::Elements(u64::from(threads * OPS_PER_THREAD)));
        for backend in [Backend::Locking, Backend::Atomic] {
            group.bench_with_input(BenchmarkId::new(backend.as_str(), threads), &threads, |b, &threads| {
                b.iter(|| {
                    let store = backend.build(SEATS, Arc::new(SystemClock)).unwrap();
                    hammer(store.as_ref(), threads);
                });
            });
        }
    }

    group.finish();
}

fn bench_single_seat_race(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_seat_race");

    for backend in [Backend::Locking, Backend::Atomic] {
        group.bench_function(backend.as_str(), |b| {
            let store = backend.build(1, Arc::new(SystemClock)).unwrap();
            b.iter(|| {
                thread::scope(|scope| {
                    for t in 1..=8 {
                        let store = store.as_ref();
                        scope.spawn(move || {
                            black_box(store.hold(SeatId(1), CallerId::new(t).unwrap(), Duration::from_secs(1)));
                        });
                    }
                });
                store.release(SeatId(1));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mixed_workload, bench_single_seat_race);
criterion_main!(benches);
