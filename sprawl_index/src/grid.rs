// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell mapping for the uniform grid.

use crate::config::DEFAULT_CELL_SIZE;
use crate::error::IndexError;
use crate::types::{Bounds, CellRange};

/// Largest cell coordinate, in either direction, on each axis.
///
/// Cell coordinates beyond it are clamped to the edge cell, so far-away bounds share the
/// outermost cells instead of overflowing. At the default cell size this is a world of
/// roughly `±2.7e11` units.
pub const CELL_LIMIT: i64 = 1 << 32;

/// Fixed-size square cell layout.
///
/// Maps world rectangles to the inclusive range of cells they touch. The cell size is
/// chosen once at construction and never changes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellGrid {
    cell_size: u32,
    size: f64,
}

impl Default for CellGrid {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            size: f64::from(DEFAULT_CELL_SIZE),
        }
    }
}

impl CellGrid {
    /// Create a grid with square cells of `cell_size` world units.
    ///
    /// A cell size of zero is a configuration error.
    pub fn new(cell_size: u32) -> Result<Self, IndexError> {
        if cell_size == 0 {
            return Err(IndexError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            size: f64::from(cell_size),
        })
    }

    /// Side length of one cell.
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    #[inline]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Inputs are pre-rounded and clamped to CELL_LIMIT right after the cast."
    )]
    fn to_i64(v: f64) -> i64 {
        (v as i64).clamp(-CELL_LIMIT, CELL_LIMIT)
    }

    /// Cell containing the point. Cells are half-open: a point on a cell's right or
    /// bottom edge belongs to the next cell.
    pub fn cell_at(&self, x: f64, y: f64) -> (i64, i64) {
        (
            Self::to_i64((x / self.size).floor()),
            Self::to_i64((y / self.size).floor()),
        )
    }

    /// Range of cells covered by `bounds`.
    ///
    /// The lower corner is `floor(min / cell)`. The upper corner is
    /// `ceil(max / cell) - 1`, so a rectangle ending exactly on a cell boundary does not
    /// spill into the next row or column, but never less than the lower corner: a
    /// zero-area rectangle still occupies the one cell it sits in.
    ///
    /// This is one cell narrower than a plain `ceil(max / cell)` upper bound with an
    /// inclusive walk, which would also file a rectangle ending on a boundary into the
    /// following cell. Raw (unfiltered) search results are therefore smaller than with
    /// that layout; filtered results are the same.
    pub fn key(&self, bounds: &Bounds) -> CellRange {
        let (x1, y1) = self.cell_at(bounds.x, bounds.y);
        let x2 = Self::to_i64((bounds.max_x() / self.size).ceil()).saturating_sub(1);
        let y2 = Self::to_i64((bounds.max_y() / self.size).ceil()).saturating_sub(1);
        CellRange::new(x1, y1, x2, y2)
    }

    /// Cells whose closed extent contains the point.
    ///
    /// A point on a shared cell edge or corner touches every cell around it, so the
    /// range covers up to two cells per axis.
    pub fn point_cells(&self, x: f64, y: f64) -> CellRange {
        let (x2, y2) = self.cell_at(x, y);
        let x1 = Self::to_i64((x / self.size).ceil()).saturating_sub(1);
        let y1 = Self::to_i64((y / self.size).ceil()).saturating_sub(1);
        CellRange::new(x1.min(x2), y1.min(y2), x2, y2)
    }

    /// World-space rectangle of a single cell.
    #[allow(
        clippy::cast_precision_loss,
        reason = "Cell coordinates far beyond 2^53 are not meaningful world positions."
    )]
    pub fn cell_bounds(&self, cx: i64, cy: i64) -> Bounds {
        let size = self.size;
        Bounds::from_xywh(cx as f64 * size, cy as f64 * size, size, size)
    }
}
