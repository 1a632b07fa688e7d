//! # Crossbar Benchmarks
//!
//! Full recomputation of currents and readout on the 4×4 array.
//!
//! Run: `cargo bench --bench crossbar_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mpu_crossbar::{Crossbar, DriveConfig, ReadoutPolicy};

fn checkerboard() -> Crossbar {
    let mut xbar = Crossbar::default();
    let bits = (0..4).flat_map(|row| (0..4).map(move |col| ((row, col), (row + col) % 2 == 0)));
    xbar.load_bits(bits);
    xbar
}

fn bench_compute_currents(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_currents");
    let xbar = checkerboard();

    for (a, b) in [(false, false), (true, false), (true, true)] {
        let drive = DriveConfig::from_inputs(a, b, 1.0).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("A{}B{}", a as u8, b as u8)),
            &drive,
            |bench, drive| bench.iter(|| black_box(xbar.compute_currents(black_box(drive)))),
        );
    }

    group.finish();
}

fn bench_simulate(c: &mut Criterion) {
    let xbar = checkerboard();
    let drive = DriveConfig::from_inputs(true, true, 1.0).unwrap();
    let policy = ReadoutPolicy::default();

    c.bench_function("simulate_readout", |b| {
        b.iter(|| black_box(xbar.simulate(black_box(&drive), &policy)))
    });
}

fn bench_load_bits(c: &mut Criterion) {
    let bits: Vec<((usize, usize), bool)> =
        (0..4).flat_map(|row| (0..4).map(move |col| ((row, col), col == row))).collect();

    c.bench_function("load_bits_16", |b| {
        b.iter(|| {
            let mut xbar = Crossbar::default();
            black_box(xbar.load_bits(bits.iter().copied()))
        })
    });
}

criterion_group!(benches, bench_compute_currents, bench_simulate, bench_load_bits);
criterion_main!(benches);
