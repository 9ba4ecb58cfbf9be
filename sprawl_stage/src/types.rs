// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the stage: entity identifiers, directions, pivots, and snapshots.

use core::str::FromStr;

use kurbo::Vec2;

use crate::error::StageError;

/// Identifier for an entity on the stage.
///
/// This is a small, copyable handle that stays stable while the entity lives and becomes
/// invalid when it is despawned. It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On spawn, a fresh slot is allocated with generation `1`, so ids of fresh slots follow
///   creation order.
/// - On despawn, the slot is freed; any existing `EntityId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `EntityId`.
///
/// Stale ids never alias a different live entity because the generation must match.
/// Use [`Stage::is_alive`](crate::Stage::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub(crate) u32, pub(crate) u32);

impl EntityId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Slot index. Slots are reused after despawn.
    pub const fn slot(self) -> u32 {
        self.0
    }

    /// Generation of the slot when this id was handed out.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// One of the eight compass directions accepted by
/// [`Stage::move_dir`](crate::Stage::move_dir).
///
/// North is up the screen (decreasing `y`), east is increasing `x`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `n`
    North,
    /// `s`
    South,
    /// `e`
    East,
    /// `w`
    West,
    /// `ne`
    NorthEast,
    /// `nw`
    NorthWest,
    /// `se`
    SouthEast,
    /// `sw`
    SouthWest,
}

impl Direction {
    /// All directions, in token order `n s e w ne nw se sw`.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];

    /// Offset produced by moving `amount` units in this direction.
    ///
    /// Diagonals move `amount` along both axes.
    pub fn delta(self, amount: f64) -> Vec2 {
        let (sx, sy) = match self {
            Self::North => (0.0, -1.0),
            Self::South => (0.0, 1.0),
            Self::East => (1.0, 0.0),
            Self::West => (-1.0, 0.0),
            Self::NorthEast => (1.0, -1.0),
            Self::NorthWest => (-1.0, -1.0),
            Self::SouthEast => (1.0, 1.0),
            Self::SouthWest => (-1.0, 1.0),
        };
        Vec2::new(sx * amount, sy * amount)
    }

    /// The lowercase token for this direction.
    pub const fn token(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::South => "s",
            Self::East => "e",
            Self::West => "w",
            Self::NorthEast => "ne",
            Self::NorthWest => "nw",
            Self::SouthEast => "se",
            Self::SouthWest => "sw",
        }
    }
}

impl FromStr for Direction {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.token() == s)
            .ok_or_else(|| StageError::InvalidDirection(s.to_owned()))
    }
}

/// Vertical part of an anchor keyword.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Vertical {
    /// `y = 0`
    Top,
    /// `y = h / 2`
    #[default]
    Middle,
    /// `y = h`
    Bottom,
}

/// Horizontal part of an anchor keyword.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Horizontal {
    /// `x = 0`
    Left,
    /// `x = w / 2`
    #[default]
    Center,
    /// `x = w`
    Right,
}

/// Rotation pivot, relative to the entity's top-left corner.
///
/// Anchors are resolved against the current size whenever the bounding rectangle is
/// recomputed, so a centered pivot stays centered when the entity is resized.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pivot {
    /// A named point of the box.
    Anchor(Vertical, Horizontal),
    /// A fixed offset in world units.
    Offset(Vec2),
}

impl Default for Pivot {
    fn default() -> Self {
        Self::CENTER
    }
}

impl Pivot {
    /// The center of the box.
    pub const CENTER: Self = Self::Anchor(Vertical::Middle, Horizontal::Center);

    /// Offset from the top-left corner of a `w` by `h` box.
    pub fn resolve(self, w: f64, h: f64) -> Vec2 {
        match self {
            Self::Offset(v) => v,
            Self::Anchor(v, hz) => {
                let y = match v {
                    Vertical::Top => 0.0,
                    Vertical::Middle => h / 2.0,
                    Vertical::Bottom => h,
                };
                let x = match hz {
                    Horizontal::Left => 0.0,
                    Horizontal::Center => w / 2.0,
                    Horizontal::Right => w,
                };
                Vec2::new(x, y)
            }
        }
    }
}

impl FromStr for Pivot {
    type Err = StageError;

    /// Parse `"center"`, `"centre"`, `"middle"`, or `"<vertical> <horizontal>"` such as
    /// `"top left"` or `"middle right"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StageError::InvalidOrigin(s.to_owned());
        let mut words = s.split_whitespace();
        let (Some(first), second, None) = (words.next(), words.next(), words.next()) else {
            return Err(invalid());
        };
        let Some(second) = second else {
            return match first {
                "center" | "centre" | "middle" => Ok(Self::CENTER),
                _ => Err(invalid()),
            };
        };
        let vertical = match first {
            "top" => Vertical::Top,
            "middle" | "center" | "centre" => Vertical::Middle,
            "bottom" => Vertical::Bottom,
            _ => return Err(invalid()),
        };
        let horizontal = match second {
            "left" => Horizontal::Left,
            "center" | "centre" | "middle" => Horizontal::Center,
            "right" => Horizontal::Right,
            _ => return Err(invalid()),
        };
        Ok(Self::Anchor(vertical, horizontal))
    }
}

bitflags::bitflags! {
    /// Mirroring applied by render backends.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FlipFlags: u8 {
        /// Mirror horizontally.
        const X = 0b0000_0001;
        /// Mirror vertically.
        const Y = 0b0000_0010;
    }
}

bitflags::bitflags! {
    /// Properties that differ between the current and the last committed [`Snapshot`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Changes: u16 {
        /// Horizontal position.
        const X        = 1 << 0;
        /// Vertical position.
        const Y        = 1 << 1;
        /// Width.
        const W        = 1 << 2;
        /// Height.
        const H        = 1 << 3;
        /// Depth.
        const Z        = 1 << 4;
        /// Rotation.
        const ROTATION = 1 << 5;
        /// Opacity.
        const ALPHA    = 1 << 6;
        /// Horizontal mirroring.
        const FLIP_X   = 1 << 7;
        /// Vertical mirroring.
        const FLIP_Y   = 1 << 8;
    }
}

/// Render-facing values of an entity at one point in time.
///
/// Render backends compare the current snapshot against the last committed one to decide
/// which visual properties to update, then commit with [`Stage::reset`](crate::Stage::reset).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
    /// Depth.
    pub z: i32,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    /// Horizontal mirroring.
    pub flip_x: bool,
    /// Vertical mirroring.
    pub flip_y: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            z: 0,
            rotation: 0.0,
            alpha: 1.0,
            flip_x: false,
            flip_y: false,
        }
    }
}

impl Snapshot {
    /// Which properties of `self` differ from `other`.
    pub fn diff(&self, other: &Self) -> Changes {
        let mut changes = Changes::empty();
        changes.set(Changes::X, self.x != other.x);
        changes.set(Changes::Y, self.y != other.y);
        changes.set(Changes::W, self.w != other.w);
        changes.set(Changes::H, self.h != other.h);
        changes.set(Changes::Z, self.z != other.z);
        changes.set(Changes::ROTATION, self.rotation != other.rotation);
        changes.set(Changes::ALPHA, self.alpha != other.alpha);
        changes.set(Changes::FLIP_X, self.flip_x != other.flip_x);
        changes.set(Changes::FLIP_Y, self.flip_y != other.flip_y);
        changes
    }
}

/// What kind of change an event reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Position or size was committed and the index entry updated.
    Moved,
    /// Width or height changed as part of a move.
    Resized,
    /// The bounding rectangle was recomputed after a rotation or pivot change.
    Rotated,
}

/// Change notification, drained with [`Stage::drain_events`](crate::Stage::drain_events).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StageEvent {
    /// The entity that changed.
    pub entity: EntityId,
    /// What changed.
    pub kind: EventKind,
}

/// Initial state of a spawned entity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EntityDesc {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width; negative values are clamped to zero.
    pub w: f64,
    /// Height; negative values are clamped to zero.
    pub h: f64,
    /// Depth. Higher is drawn on top; not used for spatial bucketing.
    pub z: i32,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    /// Rotation pivot.
    pub pivot: Pivot,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    /// Mirroring.
    pub flip: FlipFlags,
    /// Visible entities take part in draw order and hit testing.
    pub visible: bool,
}

impl Default for EntityDesc {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            z: 0,
            rotation: 0.0,
            pivot: Pivot::default(),
            alpha: 1.0,
            flip: FlipFlags::empty(),
            visible: true,
        }
    }
}

impl EntityDesc {
    /// An unrotated box at `(x, y)` of size `w` by `h`, other fields defaulted.
    pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            ..Default::default()
        }
    }
}
