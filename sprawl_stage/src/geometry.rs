// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-entity geometry record and its rectangle predicates.

use kurbo::{Affine, Point, Rect};
use sprawl_index::{Bounds, Entry};

use crate::polygon::Polygon;
use crate::types::{EntityId, FlipFlags, Pivot, Snapshot};

/// Position, size, rotation, and render state of one entity.
///
/// Records are owned by the [`Stage`](crate::Stage) and read through
/// [`Stage::geometry`](crate::Stage::geometry); all mutation goes through the stage so the
/// spatial index and attached children stay in sync.
///
/// The record is either *unrotated* (`rotation` a multiple of 360, no [`mbr`](Self::mbr)) or
/// *rotated*, in which case the index and every predicate use the bounding rectangle of
/// the rotated box.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub(crate) generation: u32,
    pub(crate) seq: u64,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) w: f64,
    pub(crate) h: f64,
    pub(crate) z: i32,
    pub(crate) rotation: f64,
    pub(crate) alpha: f64,
    pub(crate) flip: FlipFlags,
    pub(crate) visible: bool,
    pub(crate) pivot: Pivot,
    pub(crate) mbr: Option<Rect>,
    pub(crate) hit_area: Option<Polygon>,
    pub(crate) entry: Entry<EntityId>,
    pub(crate) committed: Snapshot,
    // Position at the last cascade; children are shifted by the distance from here.
    pub(crate) anchor: Bounds,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
}

impl Geometry {
    /// Left edge.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Top edge.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Width.
    pub fn w(&self) -> f64 {
        self.w
    }

    /// Height.
    pub fn h(&self) -> f64 {
        self.h
    }

    /// Depth.
    pub fn z(&self) -> i32 {
        self.z
    }

    /// Rotation in degrees, clockwise. Not normalized.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Opacity.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Mirroring.
    pub fn flip(&self) -> FlipFlags {
        self.flip
    }

    /// Whether the entity takes part in draw order and hit testing.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Rotation pivot.
    pub fn pivot(&self) -> Pivot {
        self.pivot
    }

    /// The unrotated box.
    pub fn pos(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    /// Bounding rectangle of the rotated box, or `None` while unrotated.
    pub fn mbr(&self) -> Option<Rect> {
        self.mbr
    }

    /// The authoritative rectangle: the [`mbr`](Self::mbr) when rotated, else [`pos`](Self::pos).
    pub fn bounds(&self) -> Rect {
        self.mbr.unwrap_or_else(|| self.pos())
    }

    /// `w * h`.
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Rotation pivot in world coordinates.
    pub fn origin_point(&self) -> Point {
        Point::new(self.x, self.y) + self.pivot.resolve(self.w, self.h)
    }

    /// Whether the entity overlaps `rect` (half-open on each axis).
    pub fn intersect(&self, rect: Rect) -> bool {
        to_bounds(self.bounds()).intersects(&to_bounds(rect))
    }

    /// Whether the entity lies entirely inside `rect`, edges included.
    pub fn within(&self, rect: Rect) -> bool {
        to_bounds(rect).contains(&to_bounds(self.bounds()))
    }

    /// Whether `rect` lies entirely inside the entity, edges included.
    pub fn contains(&self, rect: Rect) -> bool {
        to_bounds(self.bounds()).contains(&to_bounds(rect))
    }

    /// Whether the point lies inside the entity, edges included.
    ///
    /// When a hit area is set the point must also fall inside that polygon.
    pub fn is_at(&self, x: f64, y: f64) -> bool {
        if !to_bounds(self.bounds()).contains_point(x, y) {
            return false;
        }
        match &self.hit_area {
            Some(poly) => poly.contains_point(x - self.x, y - self.y),
            None => true,
        }
    }

    /// Polygon hit area in entity-local coordinates, if any.
    pub fn hit_area(&self) -> Option<&Polygon> {
        self.hit_area.as_ref()
    }

    /// Attached parent.
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Attached children, in attach order.
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Current render-facing values.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
            z: self.z,
            rotation: self.rotation,
            alpha: self.alpha,
            flip_x: self.flip.contains(FlipFlags::X),
            flip_y: self.flip.contains(FlipFlags::Y),
        }
    }

    /// Values as of the last [`Stage::reset`](crate::Stage::reset).
    pub fn committed(&self) -> Snapshot {
        self.committed
    }

    /// Cells of the spatial index the entity occupies.
    pub fn entry(&self) -> Entry<EntityId> {
        self.entry
    }

    pub(crate) fn xywh(&self) -> Bounds {
        Bounds {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }

    /// Recompute the cached bounding rectangle from the current fields.
    pub(crate) fn refresh_mbr(&mut self) {
        self.mbr = rotated_mbr(self.pos(), self.rotation, self.origin_point());
    }

    /// Whether the record is in the rotated state.
    pub fn is_rotated(&self) -> bool {
        self.mbr.is_some()
    }
}

/// Integer-aligned bounding rectangle of `rect` rotated `degrees` clockwise about `origin`.
///
/// Returns `None` when the rotation is a whole number of turns.
pub fn rotated_mbr(rect: Rect, degrees: f64, origin: Point) -> Option<Rect> {
    if degrees.rem_euclid(360.0) == 0.0 {
        return None;
    }
    let affine = Affine::rotate_about(degrees.to_radians(), origin);
    let bbox = transform_rect_bbox(affine, rect);
    Some(Rect::new(
        bbox.x0.floor(),
        bbox.y0.floor(),
        bbox.x1.ceil(),
        bbox.y1.ceil(),
    ))
}

fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let p0 = affine * Point::new(rect.x0, rect.y0);
    let p1 = affine * Point::new(rect.x1, rect.y0);
    let p2 = affine * Point::new(rect.x0, rect.y1);
    let p3 = affine * Point::new(rect.x1, rect.y1);
    let min_x = p0.x.min(p1.x).min(p2.x).min(p3.x);
    let min_y = p0.y.min(p1.y).min(p2.y).min(p3.y);
    let max_x = p0.x.max(p1.x).max(p2.x).max(p3.x);
    let max_y = p0.y.max(p1.y).max(p2.y).max(p3.y);
    Rect::new(min_x, min_y, max_x, max_y)
}

pub(crate) fn to_bounds(r: Rect) -> Bounds {
    Bounds::from_corners(r.x0, r.y0, r.x1, r.y1)
}
