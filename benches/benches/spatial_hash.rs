// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial hash throughput: bulk insert, in-cell and cross-cell updates, and search.

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sprawl_index::{Bounds, SpatialHash};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Bounds> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Bounds::from_xywh(x0, y0, cell, cell));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_rects(count: usize, max_w: f64, max_h: f64, rect_w: f64, rect_h: f64) -> Vec<Bounds> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let x0 = rng.next_f64() * (max_w - rect_w).max(1.0);
        let y0 = rng.next_f64() * (max_h - rect_h).max(1.0);
        out.push(Bounds::from_xywh(x0, y0, rect_w, rect_h));
    }
    out
}

fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Bounds> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * 2000.0, rng.next_f64() * 2000.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Bounds::from_xywh(cx + dx, cy + dy, 12.0, 12.0));
        }
    }
    out
}

fn filled(rects: &[Bounds], cell: u32) -> SpatialHash<u32> {
    let mut idx = SpatialHash::new(cell).unwrap();
    for (i, r) in rects.iter().enumerate() {
        let _ = idx.insert(i as u32, *r);
    }
    idx
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter_batched(
                || SpatialHash::<u32>::new(64).unwrap(),
                |mut idx| {
                    for (i, r) in rects.iter().enumerate() {
                        let _ = idx.insert(i as u32, *r);
                    }
                    black_box(idx.occupied_cells());
                },
                BatchSize::SmallInput,
            )
        });
    }
    // Large boxes span several cells each.
    let rects = gen_random_rects(4096, 2000.0, 2000.0, 150.0, 150.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("random_spanning", |b| {
        b.iter_batched(
            || SpatialHash::<u32>::new(64).unwrap(),
            |mut idx| {
                for (i, r) in rects.iter().enumerate() {
                    let _ = idx.insert(i as u32, *r);
                }
                black_box(idx.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    let rects = gen_random_rects(4096, 2000.0, 2000.0, 12.0, 12.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    for (name, step) in [("same_cell", 0.5), ("cross_cell", 64.0)] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || {
                    let mut idx = SpatialHash::<u32>::new(64).unwrap();
                    let entries: Vec<_> = rects
                        .iter()
                        .enumerate()
                        .map(|(i, r)| idx.insert(i as u32, *r))
                        .collect();
                    (idx, entries)
                },
                |(mut idx, mut entries)| {
                    for (entry, r) in entries.iter_mut().zip(&rects) {
                        let moved = Bounds::from_xywh(r.x + step, r.y, r.w, r.h);
                        black_box(entry.update(&mut idx, moved));
                    }
                    black_box(idx.mutations());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let uniform = filled(&gen_random_rects(4096, 2000.0, 2000.0, 12.0, 12.0), 64);
    let clustered = filled(&gen_clustered_rects(32, 128, 200.0), 64);
    let query = Bounds::from_xywh(800.0, 800.0, 400.0, 400.0);
    for (name, idx) in [("uniform", &uniform), ("clustered", &clustered)] {
        group.bench_function(format!("{name}_filtered"), |b| {
            b.iter(|| black_box(idx.search(black_box(&query), true).len()))
        });
        group.bench_function(format!("{name}_raw"), |b| {
            b.iter(|| black_box(idx.search(black_box(&query), false).len()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_update, bench_search);
criterion_main!(benches);
