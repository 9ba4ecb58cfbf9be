// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sprawl Index: a uniform grid spatial hash for 2D broad-phase queries.
//!
//! Sprawl Index is the bucket layer under a game world's collision and culling queries.
//!
//! - Insert ids with top-left [`Bounds`]; each id lands in every cell its bounds touch.
//! - Keep an [`Entry`] per id and call [`Entry::update`] whenever the bounds change;
//!   buckets are only rewritten when the covered [`CellRange`] changes.
//! - Search a rectangle and get each overlapping id exactly once, or ask for the raw
//!   bucket contents when a cheap superset is good enough.
//!
//! Ids are caller-supplied, non-owning references (typically entity handles). They must be
//! `Copy + Eq + Hash` and stable for as long as they are indexed.
//!
//! # Example
//!
//! ```rust
//! use sprawl_index::{Bounds, SpatialHash};
//!
//! let mut idx: SpatialHash<u32> = SpatialHash::new(64).unwrap();
//! let mut a = idx.insert(1, Bounds::from_xywh(0.0, 0.0, 32.0, 32.0));
//! let _b = idx.insert(2, Bounds::from_xywh(60.0, 60.0, 40.0, 40.0));
//!
//! // Entity 2 spans four cells but is reported once.
//! let hits = idx.search(&Bounds::from_xywh(0.0, 0.0, 128.0, 128.0), true);
//! assert_eq!(hits, [1, 2]);
//!
//! // Moving inside the same cell leaves every bucket untouched.
//! let before = idx.mutations();
//! a.update(&mut idx, Bounds::from_xywh(8.0, 8.0, 32.0, 32.0));
//! assert_eq!(idx.mutations(), before);
//! ```
//!
//! ## Cell ranges
//!
//! For bounds `(x, y, w, h)` and cell size `c` the covered range is
//! `floor(x / c) ..= ceil((x + w) / c) - 1` on each axis, never shorter than one cell.
//! Bounds ending exactly on a boundary stay out of the next cell, and zero-area bounds
//! occupy the single cell they sit in. Negative coordinates are supported.
//!
//! ## Filtering
//!
//! Bucket membership over-approximates overlap for anything spanning several cells.
//! A filtered [`SpatialHash::search`] deduplicates by id and re-checks true rectangle
//! intersection (half-open on each axis) against the last bounds reported for the id.
//!
//! A point query ([`SpatialHash::query_point`]) is closed instead: it reports every id
//! whose bounds contain the point, edges included.
//!
//! ## World extent
//!
//! Cell coordinates are clamped to [`CELL_LIMIT`] on each axis, so arbitrarily distant
//! finite bounds share the outermost cells. Bounds covering more than
//! [`IndexConfig::max_entry_cells`] cells live in an overflow list scanned by every
//! search, and a query wider than the occupied area walks only occupied cells. Insert,
//! update and search cost therefore never depends on how large a rectangle is.
//!
//! ### Float semantics
//!
//! Non-finite coordinates are replaced by zero and negative extents are clamped to zero
//! when building [`Bounds`], so cell math never sees NaN or an inverted span.

pub mod config;
pub mod entry;
pub mod error;
pub mod grid;
pub mod index;
pub mod types;

pub use config::{DEFAULT_CELL_SIZE, DEFAULT_MAX_ENTRY_CELLS, IndexConfig};
pub use entry::Entry;
pub use error::IndexError;
pub use grid::{CELL_LIMIT, CellGrid};
pub use index::SpatialHash;
pub use types::{Bounds, CellRange};
