// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index configuration.

/// Default side length of a grid cell, in world units.
pub const DEFAULT_CELL_SIZE: u32 = 64;

/// Default cap on the cells one id may be filed under.
pub const DEFAULT_MAX_ENTRY_CELLS: usize = 1024;

/// Construction parameters for a [`SpatialHash`](crate::SpatialHash).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndexConfig {
    /// Side length of each square cell. Must be positive.
    pub cell_size: u32,
    /// Bounds covering more cells than this are kept in a single overflow list that every
    /// search scans, instead of being written into each covered bucket.
    pub max_entry_cells: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            max_entry_cells: DEFAULT_MAX_ENTRY_CELLS,
        }
    }
}
