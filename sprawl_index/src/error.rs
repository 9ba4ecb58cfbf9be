// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while configuring an index.

use thiserror::Error;

/// Configuration errors for [`SpatialHash`](crate::SpatialHash).
///
/// Runtime operations (insert, update, remove, search) never fail; only building an
/// index with an unusable layout does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The cell size must be a positive number of world units.
    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(u32),
}
