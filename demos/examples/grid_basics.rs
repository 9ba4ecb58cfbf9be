// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial hash basics.
//!
//! Insert two boxes, move one inside its cell and one across cells, and query.
//!
//! Run:
//! - `RUST_LOG=sprawl_index=trace cargo run -p sprawl_demos --example grid_basics`

use sprawl_index::{Bounds, SpatialHash};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sprawl_index=debug".parse()?))
        .init();

    let mut idx: SpatialHash<u32> = SpatialHash::new(64)?;
    let mut a = idx.insert(1, Bounds::from_xywh(0.0, 0.0, 32.0, 32.0));
    let b = idx.insert(2, Bounds::from_xywh(60.0, 60.0, 40.0, 40.0));
    println!("A occupies {}, B occupies {}", a.signature(), b.signature());

    // Raw results repeat B once per shared cell; filtered results do not.
    let wide = Bounds::from_xywh(0.0, 0.0, 128.0, 128.0);
    println!("raw:      {:?}", idx.search(&wide, false));
    println!("filtered: {:?}", idx.search(&wide, true));

    // Same cell: no bucket is touched.
    let before = idx.mutations();
    let rebucketed = a.update(&mut idx, Bounds::from_xywh(16.0, 16.0, 32.0, 32.0));
    println!(
        "in-cell move re-bucketed: {rebucketed}, mutations {} -> {}",
        before,
        idx.mutations()
    );

    // Across a boundary: the entry follows.
    a.update(&mut idx, Bounds::from_xywh(200.0, 16.0, 32.0, 32.0));
    println!("A now occupies {}", a.signature());
    println!("hits at (70,70): {:?}", idx.query_point(70.0, 70.0));

    idx.remove(2);
    assert!(idx.query_point(70.0, 70.0).is_empty());
    println!("{idx:?}");
    Ok(())
}
