// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by stage operations.

use sprawl_index::IndexError;
use thiserror::Error;

use crate::types::EntityId;

/// Errors returned by [`Stage`](crate::Stage) operations.
///
/// None of these leave the stage in a partially updated state: the rejected operation
/// is simply not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// A movement token other than `n`, `s`, `e`, `w`, `ne`, `nw`, `se`, `sw`.
    #[error("invalid direction {0:?}")]
    InvalidDirection(String),
    /// An origin keyword that does not name a point of the box.
    #[error("invalid origin keyword {0:?}")]
    InvalidOrigin(String),
    /// The id was despawned (or never existed).
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
    /// Attaching `child` under `parent` would close a loop.
    #[error("attaching {child:?} to {parent:?} would create a cycle")]
    AttachCycle {
        /// Requested parent.
        parent: EntityId,
        /// Requested child, already an ancestor of `parent`.
        child: EntityId,
    },
    /// An entity cannot be attached to itself.
    #[error("entity {0:?} cannot be attached to itself")]
    SelfAttach(EntityId),
    /// Invalid spatial index configuration.
    #[error(transparent)]
    Index(#[from] IndexError),
}
