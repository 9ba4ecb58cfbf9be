// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Staggered isometric tile placement.

use kurbo::{Point, Vec2};

use crate::error::StageError;
use crate::stage::Stage;
use crate::types::EntityId;

/// A 45 degree isometric grid with square tiles of `tile` world units.
///
/// Odd rows are offset by half a tile; each row advances a quarter tile down and each level
/// of height lifts the tile by half a tile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IsoGrid {
    tile: f64,
}

impl IsoGrid {
    /// Grid with the given tile size. Powers of two keep positions integral.
    pub fn new(tile: f64) -> Self {
        Self { tile }
    }

    /// Tile size.
    pub fn tile(&self) -> f64 {
        self.tile
    }

    /// World position of tile `(x, y)` at height `z`, before the viewport offset.
    pub fn project(&self, x: i32, y: i32, z: i32) -> Point {
        let half = self.tile / 2.0;
        let m = f64::from(x) * self.tile + f64::from(y & 1) * half;
        let n = f64::from(y) * self.tile / 4.0 - f64::from(z) * half;
        Point::new(m, n)
    }

    /// Move `id` onto tile `(x, y, z)` offset by `viewport`, and raise its depth by `z`.
    pub fn place(
        &self,
        stage: &mut Stage,
        id: EntityId,
        x: i32,
        y: i32,
        z: i32,
        viewport: Vec2,
    ) -> Result<(), StageError> {
        let p = self.project(x, y, z) + viewport;
        stage.set_position(id, p.x, p.y)?;
        let depth = stage
            .geometry(id)
            .ok_or(StageError::UnknownEntity(id))?
            .z();
        stage.set_z(id, depth.saturating_add(z))
    }
}
