//! # Logic Engine Benchmarks
//!
//! Interpreter throughput and replay of catalog programs.
//!
//! Run: `cargo bench --bench logic_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mpu_gates::{GateCatalog, GateInputs, INPUT_A, INPUT_B};
use mpu_logic::{Coord, Instruction, LogicGrid, Replay, StepOutcome};

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");
    let mut grid = LogicGrid::new(2, 4).unwrap();

    let nor = Instruction::nor_write((1, 1), (0, 0), (0, 1));
    group.bench_function("nor_write", |b| b.iter(|| grid.execute(black_box(&nor))));

    let inv = Instruction::invert((0, 3));
    group.bench_function("invert", |b| b.iter(|| grid.execute(black_box(&inv))));

    let iso = Instruction::isolate([(0, 0), (0, 1), (0, 2), (0, 3)]);
    group.bench_function("isolate", |b| b.iter(|| grid.execute(black_box(&iso))));

    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    let catalog = GateCatalog::builtin();
    let inputs = GateInputs::new(true, false);

    for gate in catalog.iter() {
        let program = gate.instructions(inputs);
        let (rows, cols) = gate.dimensions();
        group.bench_with_input(BenchmarkId::from_parameter(gate.name()), &program, |b, program| {
            b.iter(|| {
                let mut grid = LogicGrid::new(rows, cols).unwrap();
                grid.set_state(INPUT_A, inputs.a).unwrap();
                grid.set_state(INPUT_B, inputs.b).unwrap();
                let mut replay = Replay::new();
                let handle = replay.start(program.clone());
                while let Ok(StepOutcome::Applied { done: false, .. }) = replay.advance(handle, &mut grid) {}
                black_box(grid.get_state(gate.output_cell()))
            })
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut grid = LogicGrid::new(2, 4).unwrap();
    grid.set_state(Coord::new(1, 1), true).unwrap();
    c.bench_function("snapshot_2x4", |b| b.iter(|| black_box(grid.snapshot())));
}

criterion_group!(benches, bench_execute, bench_replay, bench_snapshot);
criterion_main!(benches);
