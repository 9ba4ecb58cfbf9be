// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sprawl Stage: entity geometry for 2D games, kept in sync with a grid spatial index.
//!
//! Sprawl Stage is the positional core of a 2D game world.
//!
//! - Tracks position, size, depth, rotation, and pivot for every live entity.
//! - Computes the integer-aligned bounding rectangle (MBR) of rotated entities.
//! - Keeps every entity registered in a [`sprawl_index::SpatialHash`], re-bucketing only when
//!   the covered cells change.
//! - Cascades translation from parents to attached children.
//! - Exposes current and last-committed render snapshots for render backends.
//!
//! ## Commit model
//!
//! There is no batched commit step. Each mutator on [`Stage`] commits on the spot:
//! position and size changes go through [`Stage::moved`], rotation and pivot changes through
//! [`Stage::rotated`]. Both update the index entry before anything else, so a query issued
//! later in the same frame sees consistent, fully propagated positions. Each commit queues a
//! [`StageEvent`]; collect them with [`Stage::drain_events`].
//!
//! Render backends use a separate, explicit commit: compare [`Geometry::snapshot`] with
//! [`Geometry::committed`] (or call [`Stage::changes`]) and then [`Stage::reset`].
//!
//! ## Rotation
//!
//! Rotation is in degrees, clockwise on screen, about the entity's [`Pivot`] (default: the
//! center). While the rotation is not a whole number of turns the entity is *rotated*: it has
//! an [`Geometry::mbr`] and that rectangle is what the index and the predicates see.
//! Rotation is not propagated to attached children; only translation is.
//!
//! ## Attachment
//!
//! Attachment forms a forest: an entity has at most one parent, attaching it elsewhere moves
//! it, and edges that would close a loop are rejected with [`StageError::AttachCycle`].
//! Parents do not own their children; despawning a parent only detaches them.
//!
//! ## Degenerate input
//!
//! Nothing here panics inside the frame loop. Non-finite values are rejected at the setter
//! (the previous value is kept and a `tracing` warning is emitted), negative extents are
//! clamped to zero, and operations on despawned ids return [`StageError::UnknownEntity`].
//!
//! ## Extras
//!
//! - [`Gravity`]: per-frame falling that stops on floors found through the index.
//! - [`Polygon`]: precise point hit areas.
//! - [`IsoGrid`]: staggered isometric tile placement.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Rect;
//! use sprawl_stage::{EntityDesc, Stage};
//!
//! let mut stage = Stage::new();
//! let parent = stage.spawn(EntityDesc::rect(10.0, 10.0, 20.0, 20.0));
//! let child = stage.spawn(EntityDesc::rect(15.0, 15.0, 4.0, 4.0));
//! stage.attach(parent, &[child]).unwrap();
//!
//! // Only the x axis moves.
//! stage.shift(parent, 5.0, 0.0, 0.0, 0.0).unwrap();
//! let c = stage.geometry(child).unwrap();
//! assert_eq!((c.x(), c.y()), (20.0, 15.0));
//!
//! // Rotating about the center grows the indexed rectangle.
//! stage.set_rotation(parent, 45.0).unwrap();
//! let mbr = stage.geometry(parent).unwrap().mbr().unwrap();
//! assert!(mbr.width() > 20.0);
//! assert_eq!(stage.search(Rect::new(0.0, 0.0, 100.0, 100.0)), [parent, child]);
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod gravity;
pub mod iso;
pub mod polygon;
pub mod stage;
pub mod types;

pub use config::StageConfig;
pub use error::StageError;
pub use geometry::{Geometry, rotated_mbr};
pub use gravity::{Gravity, GravityOutcome};
pub use iso::IsoGrid;
pub use polygon::Polygon;
pub use stage::Stage;
pub use types::{
    Changes, Direction, EntityDesc, EntityId, EventKind, FlipFlags, Horizontal, Pivot, Snapshot,
    StageEvent, Vertical,
};
