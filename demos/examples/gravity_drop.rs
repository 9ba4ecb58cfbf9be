// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gravity on isometric tiles.
//!
//! Lay a row of floor tiles with the isometric placer and drop a crate onto them.
//!
//! Run:
//! - `cargo run -p sprawl_demos --example gravity_drop`

use kurbo::Vec2;
use sprawl_stage::{EntityDesc, Gravity, GravityOutcome, IsoGrid, Stage, StageConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sprawl_stage=info".parse()?))
        .init();

    let mut stage = Stage::with_config(&StageConfig {
        cell_size: 32,
        ..StageConfig::default()
    })?;
    let grid = IsoGrid::new(64.0);
    let mut floor = Vec::new();
    for x in 0..6 {
        let tile = stage.spawn(EntityDesc::rect(0.0, 0.0, 64.0, 16.0));
        grid.place(&mut stage, tile, x, 8, 0, Vec2::new(0.0, 100.0))?;
        floor.push(tile);
    }

    let crate_id = stage.spawn(EntityDesc::rect(150.0, 0.0, 24.0, 24.0));
    let mut gravity = Gravity::default();
    for frame in 1..=120 {
        let outcome = gravity.step(&mut stage, crate_id, |id, _| floor.contains(&id))?;
        match outcome {
            GravityOutcome::Falling => {}
            GravityOutcome::Landed(on) => {
                let y = stage.geometry(crate_id).map(|g| g.y());
                tracing::info!(frame, ?on, ?y, "landed");
            }
            GravityOutcome::Resting => break,
        }
    }
    println!("{stage:?}");
    Ok(())
}
