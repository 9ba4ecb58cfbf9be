// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `SpatialHash` API: bucket storage, insertion, removal, and search.

use core::fmt::Debug;
use core::hash::Hash;
use std::collections::{HashMap, HashSet};

use crate::config::{DEFAULT_MAX_ENTRY_CELLS, IndexConfig};
use crate::entry::Entry;
use crate::error::IndexError;
use crate::grid::CellGrid;
use crate::types::{Bounds, CellRange};

/// What the index remembers about each id: the bounds last reported for it and the
/// cells it was actually inserted into.
#[derive(Copy, Clone, Debug)]
struct Record {
    bounds: Bounds,
    range: CellRange,
}

/// Uniform grid spatial hash.
///
/// Maps cell coordinates to the ids whose bounds touch that cell. Ids are non-owning
/// references supplied by the caller; they must be stable and comparable for equality,
/// since deduplication and removal are keyed on them.
///
/// Bounds covering more than the configured number of cells are not written into every
/// bucket; they go to a single overflow list that each search scans after the buckets.
/// Likewise a query range wider than the number of occupied cells walks the occupied
/// cells instead of the range. Neither the index nor a query ever visits more cells than
/// it holds or the cap allows.
///
/// The index is single-threaded and is not internally synchronized.
pub struct SpatialHash<Id> {
    grid: CellGrid,
    buckets: HashMap<(i64, i64), Vec<Id>>,
    oversized: Vec<Id>,
    records: HashMap<Id, Record>,
    max_entry_cells: usize,
    mutations: u64,
}

impl<Id: Copy + Eq + Hash + Debug> Default for SpatialHash<Id> {
    fn default() -> Self {
        Self::from_grid(CellGrid::default(), DEFAULT_MAX_ENTRY_CELLS)
    }
}

impl<Id: Copy + Eq + Hash + Debug> SpatialHash<Id> {
    /// Create an empty index with square cells of `cell_size` world units.
    ///
    /// Fails fast with [`IndexError::InvalidCellSize`] when `cell_size` is zero.
    pub fn new(cell_size: u32) -> Result<Self, IndexError> {
        Ok(Self::from_grid(
            CellGrid::new(cell_size)?,
            DEFAULT_MAX_ENTRY_CELLS,
        ))
    }

    /// Create an empty index from a configuration block.
    pub fn with_config(config: &IndexConfig) -> Result<Self, IndexError> {
        Ok(Self::from_grid(
            CellGrid::new(config.cell_size)?,
            config.max_entry_cells,
        ))
    }

    fn from_grid(grid: CellGrid, max_entry_cells: usize) -> Self {
        Self {
            grid,
            buckets: HashMap::new(),
            oversized: Vec::new(),
            records: HashMap::new(),
            max_entry_cells,
            mutations: 0,
        }
    }

    /// The cell layout used by this index.
    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Side length of one cell.
    pub fn cell_size(&self) -> u32 {
        self.grid.cell_size()
    }

    /// Range of cells `bounds` would occupy.
    pub fn key(&self, bounds: &Bounds) -> CellRange {
        self.grid.key(bounds)
    }

    /// Insert `id` into every cell covered by `bounds`.
    ///
    /// An id that is already indexed is first removed from its previous cells, so a
    /// bucket never holds the same id twice. Returns the entry handle caching the range.
    pub fn insert(&mut self, id: Id, bounds: Bounds) -> Entry<Id> {
        if let Some(prev) = self.records.get(&id).copied() {
            self.unlink(prev.range, id);
        }
        let range = self.grid.key(&bounds);
        if self.is_oversized(range) {
            self.oversized.push(id);
            self.mutations += 1;
            tracing::debug!(?id, %range, "bounds exceed the cell cap; kept in the overflow list");
        } else {
            for cell in range.cells() {
                self.buckets.entry(cell).or_default().push(id);
                self.mutations += 1;
            }
        }
        self.records.insert(id, Record { bounds, range });
        tracing::trace!(?id, %range, "indexed");
        Entry::new(id, range)
    }

    /// Remove `id` from every cell it was inserted into. Unknown ids are ignored.
    pub fn remove(&mut self, id: Id) {
        if let Some(record) = self.records.remove(&id) {
            self.unlink(record.range, id);
            tracing::trace!(?id, range = %record.range, "removed");
        }
    }

    /// Remove `id` from the cells of an explicit `range`.
    ///
    /// Used with a cached range so that removal does not depend on geometry that may
    /// already have changed. Cells that do not hold `id` are left untouched. The id stops
    /// being indexed once the range matches the cells it was inserted into.
    pub fn remove_range(&mut self, range: CellRange, id: Id) {
        self.unlink(range, id);
        if self.records.get(&id).is_some_and(|r| r.range == range) {
            self.records.remove(&id);
        }
    }

    /// Collect the ids stored in the cells covered by `rect`.
    ///
    /// With `filter` set, each id is reported once (in first-seen, row-major cell order)
    /// and only if its recorded bounds actually intersect `rect`. Without it, the raw
    /// bucket contents are concatenated: an id appears once per shared cell and may not
    /// intersect `rect` at all. The raw list is always a superset of the filtered one.
    ///
    /// Ids in the overflow list (see the type docs) are considered after the buckets.
    pub fn search(&self, rect: &Bounds, filter: bool) -> Vec<Id> {
        let range = self.grid.key(rect);
        let mut out = Vec::new();
        if !filter {
            self.visit(range, |bucket| out.extend_from_slice(bucket));
            return out;
        }
        let mut seen = HashSet::new();
        self.visit(range, |bucket| {
            for &id in bucket {
                if seen.insert(id)
                    && let Some(record) = self.records.get(&id)
                    && record.bounds.intersects(rect)
                {
                    out.push(id);
                }
            }
        });
        out
    }

    /// Ids whose bounds cover the point, edges included, deduplicated.
    ///
    /// Agrees with [`Bounds::contains_point`]: a point on the right or bottom edge of some
    /// bounds reports them even though the half-open [`search`](Self::search) would not.
    pub fn query_point(&self, x: f64, y: f64) -> Vec<Id> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.visit(self.grid.point_cells(x, y), |bucket| {
            for &id in bucket {
                if seen.insert(id)
                    && let Some(record) = self.records.get(&id)
                    && record.bounds.contains_point(x, y)
                {
                    out.push(id);
                }
            }
        });
        out
    }

    /// Whether `id` is currently indexed.
    pub fn contains(&self, id: Id) -> bool {
        self.records.contains_key(&id)
    }

    /// Bounds last reported for `id`.
    pub fn bounds_of(&self, id: Id) -> Option<Bounds> {
        self.records.get(&id).map(|r| r.bounds)
    }

    /// Cells `id` currently occupies.
    pub fn range_of(&self, id: Id) -> Option<CellRange> {
        self.records.get(&id).map(|r| r.range)
    }

    /// Contents of a single cell.
    pub fn bucket(&self, cx: i64, cy: i64) -> &[Id] {
        self.buckets.get(&(cx, cy)).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of ids kept in the overflow list instead of buckets.
    pub fn oversized_len(&self) -> usize {
        self.oversized.len()
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.buckets.len()
    }

    /// Number of indexed ids.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count of bucket insertions and removals since construction.
    ///
    /// Useful to verify that moves within the same cell range leave buckets alone.
    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    /// Drop every id and cell. The cell size is kept.
    ///
    /// Each dropped bucket membership counts as one mutation. Entries handed out before
    /// the call become stale: updating them is a no-op.
    pub fn clear(&mut self) {
        let memberships: usize =
            self.buckets.values().map(Vec::len).sum::<usize>() + self.oversized.len();
        self.mutations += memberships as u64;
        self.buckets.clear();
        self.oversized.clear();
        self.records.clear();
    }

    /// Record new bounds for an id whose cell range has not changed.
    pub(crate) fn refresh(&mut self, id: Id, bounds: Bounds) {
        if let Some(record) = self.records.get_mut(&id) {
            record.bounds = bounds;
        }
    }

    fn is_oversized(&self, range: CellRange) -> bool {
        range.cell_count() > self.max_entry_cells
    }

    /// Call `f` with each non-empty bucket under `range` in row-major order, then with
    /// the overflow list.
    fn visit(&self, range: CellRange, mut f: impl FnMut(&[Id])) {
        if range.cell_count() <= self.buckets.len() {
            for cell in range.cells() {
                if let Some(bucket) = self.buckets.get(&cell) {
                    f(bucket);
                }
            }
        } else {
            let mut cells: Vec<(i64, i64)> = self
                .buckets
                .keys()
                .copied()
                .filter(|&(cx, cy)| range.contains(cx, cy))
                .collect();
            cells.sort_unstable_by_key(|&(cx, cy)| (cy, cx));
            for cell in cells {
                if let Some(bucket) = self.buckets.get(&cell) {
                    f(bucket);
                }
            }
        }
        if !self.oversized.is_empty() {
            f(&self.oversized);
        }
    }

    fn unlink(&mut self, range: CellRange, id: Id) {
        if self.is_oversized(range) {
            let before = self.oversized.len();
            self.oversized.retain(|&other| other != id);
            if self.oversized.len() != before {
                self.mutations += 1;
            }
            return;
        }
        for cell in range.cells() {
            let Some(bucket) = self.buckets.get_mut(&cell) else {
                continue;
            };
            let before = bucket.len();
            bucket.retain(|&other| other != id);
            if bucket.len() != before {
                self.mutations += 1;
            }
            if bucket.is_empty() {
                self.buckets.remove(&cell);
            }
        }
    }
}

impl<Id> Debug for SpatialHash<Id> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpatialHash")
            .field("cell_size", &self.grid.cell_size())
            .field("ids", &self.records.len())
            .field("cells", &self.buckets.len())
            .field("oversized", &self.oversized.len())
            .field("mutations", &self.mutations)
            .finish_non_exhaustive()
    }
}
