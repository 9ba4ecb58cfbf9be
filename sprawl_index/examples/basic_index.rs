// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Sprawl Index: insert, update through an entry, and query.

use sprawl_index::{Bounds, SpatialHash};

fn main() {
    let mut idx: SpatialHash<u32> = SpatialHash::default();
    let mut e1 = idx.insert(1, Bounds::from_xywh(0.0, 0.0, 10.0, 10.0));
    let _e2 = idx.insert(2, Bounds::from_xywh(5.0, 5.0, 100.0, 10.0));

    // Move box 1 into the next column of cells.
    let moved = e1.update(&mut idx, Bounds::from_xywh(70.0, 0.0, 10.0, 10.0));
    println!("re-bucketed: {moved}, cells: {}", e1.signature());

    // Query a point
    let hits = idx.query_point(6.0, 6.0);
    println!("hits at (6,6): {:?}", hits);
}
