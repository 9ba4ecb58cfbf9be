// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stage configuration.

use sprawl_index::{DEFAULT_CELL_SIZE, DEFAULT_MAX_ENTRY_CELLS, IndexConfig};

/// Construction-time settings for a [`Stage`](crate::Stage).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StageConfig {
    /// Side length of one spatial index cell, in world units. Must be positive.
    pub cell_size: u32,
    /// Entities whose bounds cover more cells than this are tracked outside the buckets.
    pub max_entry_cells: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            max_entry_cells: DEFAULT_MAX_ENTRY_CELLS,
        }
    }
}

impl StageConfig {
    /// Index settings derived from this configuration.
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            cell_size: self.cell_size,
            max_entry_cells: self.max_entry_cells,
        }
    }
}
