// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attachment cascade and rotation.
//!
//! Build a small ship with a turret and a flag, move and rotate it, and print what a render
//! backend would see.
//!
//! Run:
//! - `cargo run -p sprawl_demos --example attach_cascade`

use kurbo::{Point, Rect};
use sprawl_stage::{Direction, EntityDesc, Stage, StageError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sprawl_stage=debug".parse()?))
        .init();

    let mut stage = Stage::new();
    let ship = stage.spawn(EntityDesc::rect(100.0, 100.0, 60.0, 20.0));
    let turret = stage.spawn(EntityDesc {
        z: 1,
        ..EntityDesc::rect(120.0, 90.0, 12.0, 12.0)
    });
    let flag = stage.spawn(EntityDesc::rect(124.0, 70.0, 4.0, 20.0));
    stage.attach(ship, &[turret])?;
    stage.attach(turret, &[flag])?;

    // Cycles are refused.
    match stage.attach(flag, &[ship]) {
        Err(StageError::AttachCycle { .. }) => println!("flag -> ship rejected"),
        other => println!("unexpected: {other:?}"),
    }

    stage.move_dir(ship, Direction::East, 50.0)?;
    stage.move_toward(ship, "s", 10.0)?;
    for (name, id) in [("ship", ship), ("turret", turret), ("flag", flag)] {
        let g = stage.geometry(id).ok_or(StageError::UnknownEntity(id))?;
        println!("{name:>6}: {:?} changes {:?}", g.pos(), stage.changes(id));
    }

    // Only the ship turns; attached entities keep their orientation.
    stage.set_origin_keyword(ship, "middle left")?;
    stage.set_rotation(ship, 30.0)?;
    let g = stage.geometry(ship).ok_or(StageError::UnknownEntity(ship))?;
    println!("ship mbr: {:?}", g.mbr());

    println!("events: {:?}", stage.drain_events());
    stage.reset_all();

    let view = Rect::new(0.0, 0.0, 400.0, 300.0);
    println!("draw order: {:?}", stage.draw_order(view));
    println!("topmost at turret: {:?}", stage.hit_test(Point::new(175.0, 105.0)));
    Ok(())
}
