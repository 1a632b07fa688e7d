//! # Session Benchmarks
//!
//! End-to-end gate runs without pacing and state derivation.
//!
//! Run: `cargo bench --bench session_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mpu_orchestration::{Scheduler, Session, SimConfig};

fn quiet_config() -> SimConfig {
    SimConfig {
        step_delay_ms: 0,
        ..SimConfig::default()
    }
}

fn bench_run_to_completion(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_to_completion");

    for gate in ["NOT", "AND", "XOR"] {
        let mut session = Session::new(quiet_config()).unwrap();
        session.select_gate(gate).unwrap();
        session.set_inputs(true, true).unwrap();
        let mut scheduler = Scheduler::best_effort();

        group.bench_function(BenchmarkId::from_parameter(gate), |b| {
            b.iter(|| black_box(session.run_to_completion(&mut scheduler).unwrap()))
        });
    }

    group.finish();
}

fn bench_derive_state(c: &mut Criterion) {
    let mut session = Session::new(quiet_config()).unwrap();
    session.select_gate("XNOR").unwrap();
    session.set_inputs(true, false).unwrap();
    session.run_to_completion(&mut Scheduler::best_effort()).unwrap();

    c.bench_function("derive_state", |b| b.iter(|| black_box(session.derive_state())));
}

criterion_group!(benches, bench_run_to_completion, bench_derive_state);
criterion_main!(benches);
