// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simple falling behavior driven by index queries.

use kurbo::Rect;

use crate::error::StageError;
use crate::geometry::Geometry;
use crate::stage::Stage;
use crate::types::EntityId;

/// Result of one [`Gravity::step`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GravityOutcome {
    /// Nothing below; the entity keeps falling.
    Falling,
    /// The entity hit a floor this frame and was snapped on top of it.
    Landed(EntityId),
    /// The entity is standing on a floor it landed on earlier.
    Resting,
}

/// Per-entity falling state.
///
/// Each frame the vertical velocity grows by twice the strength while falling. A probe one
/// unit below the entity is looked up in the stage index; the first candidate accepted by
/// the floor predicate that overlaps the probe stops the fall.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Gravity {
    strength: f64,
    velocity: f64,
    falling: bool,
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl Gravity {
    /// Start falling with the given per-frame strength.
    pub fn new(strength: f64) -> Self {
        Self {
            strength,
            velocity: 0.0,
            falling: true,
        }
    }

    /// Current downward velocity.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Whether the entity is in the air.
    pub fn is_falling(&self) -> bool {
        self.falling
    }

    /// Advance one frame for `id`.
    ///
    /// `is_floor` decides which other entities count as ground.
    pub fn step<F>(
        &mut self,
        stage: &mut Stage,
        id: EntityId,
        mut is_floor: F,
    ) -> Result<GravityOutcome, StageError>
    where
        F: FnMut(EntityId, &Geometry) -> bool,
    {
        if self.falling {
            self.velocity += self.strength * 2.0;
            stage.shift(id, 0.0, self.velocity, 0.0, 0.0)?;
        } else {
            self.velocity = 0.0;
        }

        let pos = stage
            .geometry(id)
            .ok_or(StageError::UnknownEntity(id))?
            .pos();
        let probe = Rect::new(pos.x0, pos.y0 + 1.0, pos.x1, pos.y1 + 1.0);
        let floor = stage.search(probe).into_iter().find(|&other| {
            other != id
                && stage
                    .geometry(other)
                    .is_some_and(|g| is_floor(other, g) && g.intersect(probe))
        });

        let Some(floor) = floor else {
            self.falling = true;
            return Ok(GravityOutcome::Falling);
        };
        if !self.falling {
            return Ok(GravityOutcome::Resting);
        }
        let (top, height) = match (stage.geometry(floor), stage.geometry(id)) {
            (Some(f), Some(g)) => (f.y(), g.h()),
            _ => return Err(StageError::UnknownEntity(floor)),
        };
        let x = pos.x0;
        stage.set_position(id, x, top - height)?;
        self.falling = false;
        tracing::debug!(?id, ?floor, "landed");
        Ok(GravityOutcome::Landed(floor))
    }
}
