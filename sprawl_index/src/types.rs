// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::fmt;

/// Axis-aligned rectangle in world units, anchored at its top-left corner.
///
/// Extents are never negative: [`Bounds::from_xywh`] clamps negative or non-finite
/// widths and heights to zero so that cell-range math never sees an inverted span.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width (non-negative).
    pub w: f64,
    /// Height (non-negative).
    pub h: f64,
}

impl Bounds {
    /// A zero-sized rectangle at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    /// Create bounds from a top-left corner and a size.
    ///
    /// Non-finite coordinates become `0.0`; negative or non-finite extents become `0.0`.
    pub fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x: finite_or_zero(x),
            y: finite_or_zero(y),
            w: extent(w),
            h: extent(h),
        }
    }

    /// Create bounds from two corners, in any order.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self::from_xywh(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Right edge (`x + w`).
    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge (`y + h`).
    #[inline]
    pub fn max_y(&self) -> f64 {
        self.y + self.h
    }

    /// `w * h`.
    #[inline]
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Whether the two rectangles overlap.
    ///
    /// Each axis is treated as a half-open span `[min, max)`. An axis with zero extent
    /// behaves like a point that must fall inside the other span, so zero-area bounds
    /// still intersect the region they sit in.
    pub fn intersects(&self, other: &Self) -> bool {
        spans_overlap(self.x, self.max_x(), other.x, other.max_x())
            && spans_overlap(self.y, self.max_y(), other.y, other.max_y())
    }

    /// Whether the point lies inside, edges included.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.x <= x && x <= self.max_x() && self.y <= y && y <= self.max_y()
    }

    /// Whether `other` lies entirely inside `self`, edges included.
    pub fn contains(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.max_x() <= self.max_x()
            && other.y >= self.y
            && other.max_y() <= self.max_y()
    }

    /// Smallest bounds covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self::from_corners(
            min_t(self.x, other.x),
            min_t(self.y, other.y),
            max_t(self.max_x(), other.max_x()),
            max_t(self.max_y(), other.max_y()),
        )
    }
}

/// Inclusive rectangle of grid cells `[x1, x2] × [y1, y2]`.
///
/// The range doubles as the composite hash an [`Entry`](crate::Entry) compares to decide
/// whether re-bucketing is needed. Its [`Display`](fmt::Display) form is the canonical
/// textual hash: the four integers joined by a single space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// First column.
    pub x1: i64,
    /// First row.
    pub y1: i64,
    /// Last column (inclusive).
    pub x2: i64,
    /// Last row (inclusive).
    pub y2: i64,
}

impl CellRange {
    /// Create a range; the upper corner is raised to the lower one if it falls below it.
    pub const fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self {
            x1,
            y1,
            x2: if x2 < x1 { x1 } else { x2 },
            y2: if y2 < y1 { y1 } else { y2 },
        }
    }

    /// Whether the cell `(cx, cy)` is part of the range.
    pub const fn contains(&self, cx: i64, cy: i64) -> bool {
        self.x1 <= cx && cx <= self.x2 && self.y1 <= cy && cy <= self.y2
    }

    /// Number of cells covered, saturating at `usize::MAX`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Checked against usize::MAX just before the cast."
    )]
    pub const fn cell_count(&self) -> usize {
        let cols = self.x2.abs_diff(self.x1).saturating_add(1);
        let rows = self.y2.abs_diff(self.y1).saturating_add(1);
        let total = cols.saturating_mul(rows);
        if total > usize::MAX as u64 {
            usize::MAX
        } else {
            total as usize
        }
    }

    /// Iterate the cells row by row (y outer, x inner).
    pub fn cells(&self) -> impl Iterator<Item = (i64, i64)> + use<> {
        let Self { x1, y1, x2, y2 } = *self;
        (y1..=y2).flat_map(move |y| (x1..=x2).map(move |x| (x, y)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x1, self.y1, self.x2, self.y2)
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn extent(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Half-open overlap of `[a0, a1)` and `[b0, b1)`; empty spans act as points.
fn spans_overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> bool {
    match (a1 > a0, b1 > b0) {
        (true, true) => a0 < b1 && b0 < a1,
        (false, true) => b0 <= a0 && a0 < b1,
        (true, false) => a0 <= b0 && b0 < a1,
        (false, false) => a0 == b0,
    }
}

pub(crate) fn min_t(a: f64, b: f64) -> f64 {
    if b < a { b } else { a }
}

pub(crate) fn max_t(a: f64, b: f64) -> f64 {
    if b > a { b } else { a }
}
