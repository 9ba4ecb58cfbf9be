// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polygon hit areas.

use kurbo::{Affine, Point, Rect, Vec2};

/// A closed polygon used as a precise hit area.
///
/// Points are listed in order; the last point connects back to the first. When attached to
/// an entity with [`Stage::set_hit_area`](crate::Stage::set_hit_area) the points are
/// relative to the entity's top-left corner.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Create a polygon from its vertices.
    pub fn new(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    /// The vertices.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Even-odd point containment.
    ///
    /// ```
    /// use kurbo::Point;
    /// use sprawl_stage::Polygon;
    ///
    /// let tri = Polygon::new([Point::new(50.0, 0.0), Point::new(100.0, 100.0), Point::new(0.0, 100.0)]);
    /// assert!(tri.contains_point(50.0, 50.0));
    /// assert!(!tri.contains_point(0.0, 0.0));
    /// ```
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let p = &self.points;
        if p.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = p.len() - 1;
        for i in 0..p.len() {
            let (a, b) = (p[i], p[j]);
            if (a.y > y) != (b.y > y) && x < (b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Move every vertex by `(dx, dy)`.
    pub fn shift(&mut self, dx: f64, dy: f64) {
        let d = Vec2::new(dx, dy);
        for p in &mut self.points {
            *p += d;
        }
    }

    /// Rotate every vertex `degrees` clockwise about `origin`, flooring the results.
    pub fn rotate(&mut self, degrees: f64, origin: Point) {
        let affine = Affine::rotate_about(degrees.to_radians(), origin);
        for p in &mut self.points {
            let q = affine * *p;
            *p = Point::new(q.x.floor(), q.y.floor());
        }
    }

    /// Axis-aligned bounds of the vertices, or `None` for an empty polygon.
    pub fn bounding_box(&self) -> Option<Rect> {
        let (first, rest) = self.points.split_first()?;
        Some(
            rest.iter()
                .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
        )
    }
}
