//! Benchmarks for the board engine
//!
//! Run with: cargo bench -p gridboard-layout

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use gridboard_layout::{
    Engine, GestureCommand, GridMetrics, GridRect, PixelPoint, grid_to_pixel, replay, resolve,
    snap,
};
use std::hint::black_box;

fn metrics() -> GridMetrics {
    GridMetrics::from_container_width(1200.0, 12).unwrap()
}

/// A column of `n` anchored boxes stacked in rows 1..=n.
fn make_column(n: u16) -> Vec<GridRect> {
    (1..=n).map(|row| GridRect::new(1, row, 2, 1)).collect()
}

fn bench_snap(c: &mut Criterion) {
    let mut group = c.benchmark_group("board/snap");
    let m = metrics();

    for frac in [0.1_f64, 0.49, 0.51, 0.9] {
        let px = grid_to_pixel(&GridRect::new(4, 3, 2, 1), &m)
            .translated(m.col_step() * frac, m.row_step() * frac);
        group.bench_with_input(
            BenchmarkId::new("offset_frac", format!("{frac}")),
            &px,
            |b, px| b.iter(|| black_box(snap(px, &m))),
        );
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("board/resolve");

    for n in [1_u16, 10, 50, 100] {
        let others = make_column(n);
        // The candidate lands on row 1 and has to probe past the whole column.
        let candidate = GridRect::new(1, 1, 2, 1);
        group.bench_with_input(BenchmarkId::new("column_depth", n), &others, |b, others| {
            b.iter(|| black_box(resolve(candidate, others)))
        });
    }

    group.finish();
}

fn bench_drag_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("board/drag_frame");
    let m = metrics();

    for n in [5_usize, 25, 100] {
        group.bench_function(BenchmarkId::new("boxes", n), |b| {
            b.iter_batched(
                || {
                    let mut e = Engine::new(m);
                    for _ in 0..n {
                        e.apply(GestureCommand::AddBox);
                    }
                    let id = e.board().boxes()[0].id.clone();
                    e.apply(GestureCommand::BeginDrag {
                        id: id.clone(),
                        pointer: PixelPoint::new(1.0, 1.0),
                    });
                    (e, id)
                },
                |(mut e, id)| {
                    e.apply(GestureCommand::UpdateDrag {
                        id,
                        pointer: PixelPoint::new(400.0, 300.0),
                    });
                    black_box(e)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("board/replay");

    for n in [10_usize, 100, 500] {
        let trace: Vec<GestureCommand> = (0..n).map(|_| GestureCommand::AddBox).collect();
        group.bench_with_input(BenchmarkId::new("adds", n), &trace, |b, trace| {
            b.iter(|| black_box(replay(metrics(), trace)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_snap,
    bench_resolve,
    bench_drag_frame,
    bench_replay
);
criterion_main!(benches);
