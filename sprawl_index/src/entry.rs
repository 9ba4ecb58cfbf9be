// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-id handle caching the occupied cell range.

use core::fmt::Debug;
use core::hash::Hash;

use crate::index::SpatialHash;
use crate::types::{Bounds, CellRange};

/// Handle returned by [`SpatialHash::insert`].
///
/// The entry remembers which cells its id was inserted into, so that moving the id
/// only touches buckets when the covered range actually changes. It holds no reference
/// to the index; the owning index is passed to [`Entry::update`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Entry<Id> {
    id: Id,
    range: CellRange,
}

impl<Id: Copy + Eq + Hash + Debug> Entry<Id> {
    pub(crate) const fn new(id: Id, range: CellRange) -> Self {
        Self { id, range }
    }

    /// The indexed id.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Cells occupied as of the last insert or update.
    pub fn range(&self) -> CellRange {
        self.range
    }

    /// Canonical textual hash of the cached range, e.g. `"0 0 1 1"`.
    pub fn signature(&self) -> String {
        self.range.to_string()
    }

    /// Move the id to `bounds`.
    ///
    /// When the new bounds cover the same cells as before no bucket is touched. Otherwise
    /// the id is removed from its cached cells and inserted into the new ones.
    /// Returns `true` when re-bucketing happened.
    ///
    /// Updating an entry whose id has already been removed from `index` does nothing:
    /// a removed id is never silently re-inserted. If the id was inserted again since this
    /// entry was handed out, the entry first adopts the range the index has on record.
    pub fn update(&mut self, index: &mut SpatialHash<Id>, bounds: Bounds) -> bool {
        let Some(current) = index.range_of(self.id) else {
            tracing::debug!(id = ?self.id, "update on a removed entry ignored");
            return false;
        };
        if current != self.range {
            tracing::debug!(id = ?self.id, cached = %self.range, %current, "entry resynced");
            self.range = current;
        }
        let range = index.key(&bounds);
        if range == self.range {
            index.refresh(self.id, bounds);
            return false;
        }
        index.remove_range(self.range, self.id);
        let old = self.range;
        *self = index.insert(self.id, bounds);
        tracing::debug!(id = ?self.id, from = %old, to = %self.range, "re-bucketed");
        true
    }
}
