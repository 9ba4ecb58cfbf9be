// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One simulated frame on a populated stage: move everything, rotate some, query.

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Rect;
use sprawl_stage::{Direction, EntityDesc, EntityId, Stage};

fn populated(n: usize, attach_every: usize) -> (Stage, Vec<EntityId>) {
    let mut stage = Stage::new();
    let mut ids = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            ids.push(stage.spawn(EntityDesc::rect(x as f64 * 24.0, y as f64 * 24.0, 16.0, 16.0)));
        }
    }
    if attach_every > 0 {
        for pair in ids.chunks(attach_every) {
            if let [parent, children @ ..] = pair {
                stage.attach(*parent, children).unwrap();
            }
        }
    }
    (stage, ids)
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("stage_frame");
    for &n in &[32usize, 64] {
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("move_all_n{}", n), |b| {
            b.iter_batched(
                || populated(n, 0),
                |(mut stage, ids)| {
                    for id in &ids {
                        stage.move_dir(*id, Direction::SouthEast, 3.0).unwrap();
                    }
                    black_box(stage.drain_events().len());
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("cascade_n{}", n), |b| {
            b.iter_batched(
                || populated(n, 4),
                |(mut stage, ids)| {
                    for id in ids.iter().step_by(4) {
                        stage.move_dir(*id, Direction::East, 40.0).unwrap();
                    }
                    black_box(stage.drain_events().len());
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("rotate_query_n{}", n), |b| {
            b.iter_batched(
                || populated(n, 0),
                |(mut stage, ids)| {
                    for id in ids.iter().step_by(3) {
                        stage.rotate_by(*id, 15.0).unwrap();
                    }
                    let hits = stage.search(Rect::new(100.0, 100.0, 500.0, 500.0));
                    black_box(hits.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_frame);
criterion_main!(benches);
