// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core stage implementation: entity storage, mutation, cascades, queries.

use kurbo::{Point, Rect, Vec2};
use sprawl_index::{Bounds, SpatialHash};

use crate::config::StageConfig;
use crate::error::StageError;
use crate::geometry::{Geometry, to_bounds};
use crate::polygon::Polygon;
use crate::types::{
    Changes, Direction, EntityDesc, EntityId, EventKind, FlipFlags, Pivot, Snapshot, StageEvent,
};

/// A world of entities sharing one spatial index.
///
/// Every live entity owns a [`Geometry`] record and is registered in the index from spawn to
/// despawn. Mutators commit immediately: the entry is re-bucketed when needed, the movement
/// is cascaded to attached children, and a [`StageEvent`] is queued.
pub struct Stage {
    entities: Vec<Option<Geometry>>, // slots
    generations: Vec<u32>,           // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    spawned: u64,
    index: SpatialHash<EntityId>,
    events: Vec<StageEvent>,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entities.len();
        let alive = self.entities.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Stage")
            .field("entities_total", &total)
            .field("entities_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("pending_events", &self.events.len())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

fn live(entities: &[Option<Geometry>], id: EntityId) -> Option<&Geometry> {
    let g = entities.get(id.idx())?.as_ref()?;
    (g.generation == id.1).then_some(g)
}

fn live_mut(entities: &mut [Option<Geometry>], id: EntityId) -> Option<&mut Geometry> {
    let g = entities.get_mut(id.idx())?.as_mut()?;
    if g.generation != id.1 {
        return None;
    }
    Some(g)
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

impl Stage {
    /// Create an empty stage with the default cell size.
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            spawned: 0,
            index: SpatialHash::default(),
            events: Vec::new(),
        }
    }

    /// Create an empty stage from a configuration block.
    ///
    /// Fails when the configured cell size is zero.
    pub fn with_config(config: &StageConfig) -> Result<Self, StageError> {
        Ok(Self {
            index: SpatialHash::with_config(&config.index_config())?,
            ..Self::new()
        })
    }

    /// The shared spatial index.
    pub fn index(&self) -> &SpatialHash<EntityId> {
        &self.index
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no entity is alive.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns true if `id` refers to a live entity.
    ///
    /// See [`EntityId`] docs for the generational semantics.
    pub fn is_alive(&self, id: EntityId) -> bool {
        live(&self.entities, id).is_some()
    }

    /// Geometry of a live entity.
    pub fn geometry(&self, id: EntityId) -> Option<&Geometry> {
        live(&self.entities, id)
    }

    /// Iterate the ids of all live entities in slot order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().map(|g| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "EntityId uses 32-bit indices by design."
                )]
                EntityId::new(i as u32, g.generation)
            })
        })
    }

    fn get_mut(&mut self, id: EntityId) -> Result<&mut Geometry, StageError> {
        live_mut(&mut self.entities, id).ok_or(StageError::UnknownEntity(id))
    }

    fn get(&self, id: EntityId) -> Result<&Geometry, StageError> {
        live(&self.entities, id).ok_or(StageError::UnknownEntity(id))
    }

    // --- lifecycle ---

    /// Create an entity and register it with the index.
    ///
    /// Non-finite fields of `desc` fall back to their defaults and negative extents are
    /// clamped to zero.
    pub fn spawn(&mut self, desc: EntityDesc) -> EntityId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "EntityId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.entities.push(None);
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "EntityId uses 32-bit indices by design."
            )]
            ((self.entities.len() - 1) as u32, generation)
        };
        let id = EntityId::new(idx, generation);

        if !all_finite(&[desc.x, desc.y, desc.w, desc.h, desc.rotation, desc.alpha]) {
            tracing::warn!(?id, "non-finite spawn values replaced with defaults");
        }
        let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        let x = finite(desc.x, 0.0);
        let y = finite(desc.y, 0.0);
        let w = finite(desc.w, 0.0).max(0.0);
        let h = finite(desc.h, 0.0).max(0.0);
        let pos = Rect::new(x, y, x + w, y + h);
        self.spawned += 1;
        let mut geometry = Geometry {
            generation,
            seq: self.spawned,
            x,
            y,
            w,
            h,
            z: desc.z,
            rotation: finite(desc.rotation, 0.0),
            alpha: finite(desc.alpha, 1.0).clamp(0.0, 1.0),
            flip: desc.flip,
            visible: desc.visible,
            pivot: desc.pivot,
            mbr: None,
            hit_area: None,
            entry: self.index.insert(id, to_bounds(pos)),
            committed: Snapshot::default(),
            anchor: Bounds { x, y, w, h },
            parent: None,
            children: Vec::new(),
        };
        geometry.refresh_mbr();
        if let Some(mbr) = geometry.mbr {
            geometry.entry.update(&mut self.index, to_bounds(mbr));
        }
        geometry.committed = geometry.snapshot();
        self.entities[id.idx()] = Some(geometry);
        tracing::debug!(?id, x, y, w, h, "spawned");
        id
    }

    /// Remove an entity from the index and from the attachment graph.
    ///
    /// Children are detached, not despawned; their lifetime is independent of the parent.
    pub fn despawn(&mut self, id: EntityId) -> Result<(), StageError> {
        let (parent, children) = {
            let g = self.get_mut(id)?;
            (g.parent.take(), core::mem::take(&mut g.children))
        };
        if let Some(p) = parent.and_then(|p| live_mut(&mut self.entities, p)) {
            p.children.retain(|c| *c != id);
        }
        for child in children {
            if let Some(c) = live_mut(&mut self.entities, child) {
                c.parent = None;
            }
        }
        self.index.remove(id);
        self.entities[id.idx()] = None;
        self.free_list.push(id.idx());
        tracing::debug!(?id, "despawned");
        Ok(())
    }

    // --- mutators ---

    /// Add `(dx, dy)` to the position and `(dw, dh)` to the size, then commit via
    /// [`moved`](Self::moved).
    ///
    /// All-zero deltas are skipped without an event. Non-finite deltas are rejected and the
    /// geometry is left unchanged. Extents never drop below zero.
    pub fn shift(
        &mut self,
        id: EntityId,
        dx: f64,
        dy: f64,
        dw: f64,
        dh: f64,
    ) -> Result<(), StageError> {
        let g = self.get_mut(id)?;
        if !all_finite(&[dx, dy, dw, dh]) {
            tracing::warn!(?id, dx, dy, dw, dh, "non-finite shift rejected");
            return Ok(());
        }
        if dx == 0.0 && dy == 0.0 && dw == 0.0 && dh == 0.0 {
            return Ok(());
        }
        g.x += dx;
        g.y += dy;
        g.w = (g.w + dw).max(0.0);
        g.h = (g.h + dh).max(0.0);
        self.moved(id)
    }

    /// Move the top-left corner to `(x, y)`.
    pub fn set_position(&mut self, id: EntityId, x: f64, y: f64) -> Result<(), StageError> {
        let g = self.get(id)?;
        let (dx, dy) = (x - g.x, y - g.y);
        self.shift(id, dx, dy, 0.0, 0.0)
    }

    /// Resize to `w` by `h`; negative values are clamped to zero.
    pub fn set_size(&mut self, id: EntityId, w: f64, h: f64) -> Result<(), StageError> {
        let g = self.get(id)?;
        let (dw, dh) = (w.max(0.0) - g.w, h.max(0.0) - g.h);
        self.shift(id, 0.0, 0.0, dw, dh)
    }

    /// Move `amount` units toward a compass direction.
    pub fn move_dir(
        &mut self,
        id: EntityId,
        direction: Direction,
        amount: f64,
    ) -> Result<(), StageError> {
        let d = direction.delta(amount);
        self.shift(id, d.x, d.y, 0.0, 0.0)
    }

    /// Move `amount` units toward a direction token (`n`, `s`, `e`, `w`, `ne`, `nw`, `se`, `sw`).
    ///
    /// Unknown tokens return [`StageError::InvalidDirection`] and leave the geometry unchanged.
    pub fn move_toward(&mut self, id: EntityId, token: &str, amount: f64) -> Result<(), StageError> {
        self.get(id)?;
        let direction: Direction = token.parse()?;
        self.move_dir(id, direction, amount)
    }

    /// Set the rotation in degrees, clockwise, and recompute the bounding rectangle.
    pub fn set_rotation(&mut self, id: EntityId, degrees: f64) -> Result<(), StageError> {
        let g = self.get_mut(id)?;
        if !degrees.is_finite() {
            tracing::warn!(?id, degrees, "non-finite rotation rejected");
            return Ok(());
        }
        if g.rotation == degrees {
            return Ok(());
        }
        g.rotation = degrees;
        self.rotated(id)
    }

    /// Add `degrees` to the rotation.
    pub fn rotate_by(&mut self, id: EntityId, degrees: f64) -> Result<(), StageError> {
        let current = self.get(id)?.rotation;
        self.set_rotation(id, current + degrees)
    }

    /// Set the rotation pivot as an offset from the top-left corner.
    pub fn set_origin(&mut self, id: EntityId, x: f64, y: f64) -> Result<(), StageError> {
        if !all_finite(&[x, y]) {
            self.get(id)?;
            tracing::warn!(?id, x, y, "non-finite origin rejected");
            return Ok(());
        }
        self.set_pivot(id, Pivot::Offset(Vec2::new(x, y)))
    }

    /// Set the rotation pivot from a keyword such as `"center"` or `"bottom right"`.
    pub fn set_origin_keyword(&mut self, id: EntityId, keyword: &str) -> Result<(), StageError> {
        self.get(id)?;
        let pivot: Pivot = keyword.parse()?;
        self.set_pivot(id, pivot)
    }

    /// Set the rotation pivot.
    pub fn set_pivot(&mut self, id: EntityId, pivot: Pivot) -> Result<(), StageError> {
        let g = self.get_mut(id)?;
        if g.pivot == pivot {
            return Ok(());
        }
        g.pivot = pivot;
        self.rotated(id)
    }

    /// Set the depth. Depth does not affect spatial bucketing.
    pub fn set_z(&mut self, id: EntityId, z: i32) -> Result<(), StageError> {
        self.get_mut(id)?.z = z;
        Ok(())
    }

    /// Set the opacity, clamped to `[0, 1]`.
    pub fn set_alpha(&mut self, id: EntityId, alpha: f64) -> Result<(), StageError> {
        let g = self.get_mut(id)?;
        if alpha.is_finite() {
            g.alpha = alpha.clamp(0.0, 1.0);
        } else {
            tracing::warn!(?id, alpha, "non-finite alpha rejected");
        }
        Ok(())
    }

    /// Set the mirroring flags.
    pub fn set_flip(&mut self, id: EntityId, flip: FlipFlags) -> Result<(), StageError> {
        self.get_mut(id)?.flip = flip;
        Ok(())
    }

    /// Show or hide the entity. Hidden entities stay indexed but are skipped by
    /// [`draw_order`](Self::draw_order) and [`hit_test`](Self::hit_test).
    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> Result<(), StageError> {
        self.get_mut(id)?.visible = visible;
        Ok(())
    }

    /// Attach a polygon hit area, in entity-local coordinates, used by
    /// [`Geometry::is_at`] and point queries.
    pub fn set_hit_area(&mut self, id: EntityId, area: Option<Polygon>) -> Result<(), StageError> {
        self.get_mut(id)?.hit_area = area;
        Ok(())
    }

    // --- commits ---

    /// Commit a position or size change.
    ///
    /// Recomputes the bounding rectangle when rotated, updates the index entry with the
    /// authoritative rectangle, then shifts every attached child by the distance moved since
    /// the previous commit, in attach order. Children are updated strictly after the
    /// parent's entry. Rotation is not cascaded.
    pub fn moved(&mut self, id: EntityId) -> Result<(), StageError> {
        let (dx, dy, resized, children) = {
            let Self {
                entities,
                index,
                events,
                ..
            } = self;
            let g = live_mut(entities, id).ok_or(StageError::UnknownEntity(id))?;
            g.refresh_mbr();
            let bounds = to_bounds(g.bounds());
            g.entry.update(index, bounds);
            let current = g.xywh();
            let anchor = core::mem::replace(&mut g.anchor, current);
            let resized = anchor.w != g.w || anchor.h != g.h;
            events.push(StageEvent {
                entity: id,
                kind: EventKind::Moved,
            });
            if resized {
                events.push(StageEvent {
                    entity: id,
                    kind: EventKind::Resized,
                });
            }
            (g.x - anchor.x, g.y - anchor.y, resized, g.children.clone())
        };
        if dx == 0.0 && dy == 0.0 {
            return Ok(());
        }
        if !children.is_empty() {
            tracing::debug!(?id, dx, dy, resized, children = children.len(), "cascade");
        }
        for child in children {
            self.shift(child, dx, dy, 0.0, 0.0)?;
        }
        Ok(())
    }

    /// Commit a rotation or pivot change.
    ///
    /// Recomputes the bounding rectangle (or clears it on a whole number of turns) and
    /// updates the index entry. Children are not rotated.
    pub fn rotated(&mut self, id: EntityId) -> Result<(), StageError> {
        let Self {
            entities,
            index,
            events,
            ..
        } = self;
        let g = live_mut(entities, id).ok_or(StageError::UnknownEntity(id))?;
        g.refresh_mbr();
        let bounds = to_bounds(g.bounds());
        g.entry.update(index, bounds);
        events.push(StageEvent {
            entity: id,
            kind: EventKind::Rotated,
        });
        Ok(())
    }

    // --- attachment ---

    /// Attach `children` to `parent` so they follow its movement.
    ///
    /// A child already attached elsewhere is moved to `parent`. The whole call is rejected
    /// if any child is unknown, is `parent` itself, or is an ancestor of `parent`.
    pub fn attach(&mut self, parent: EntityId, children: &[EntityId]) -> Result<(), StageError> {
        self.get(parent)?;
        for &child in children {
            self.get(child)?;
            if child == parent {
                return Err(StageError::SelfAttach(child));
            }
            if self.is_ancestor(child, parent) {
                return Err(StageError::AttachCycle { parent, child });
            }
        }
        for &child in children {
            let previous = self.get_mut(child)?.parent.replace(parent);
            match previous {
                Some(p) if p == parent => continue,
                Some(p) => {
                    if let Some(old) = live_mut(&mut self.entities, p) {
                        old.children.retain(|c| *c != child);
                    }
                    tracing::debug!(?child, from = ?p, to = ?parent, "re-parented");
                }
                None => {}
            }
            self.get_mut(parent)?.children.push(child);
        }
        Ok(())
    }

    /// Detach one child, or every child when `child` is `None`.
    ///
    /// Detaching an entity that is not a child of `parent` is a no-op.
    pub fn detach(&mut self, parent: EntityId, child: Option<EntityId>) -> Result<(), StageError> {
        let removed = {
            let p = self.get_mut(parent)?;
            match child {
                None => core::mem::take(&mut p.children),
                Some(c) => {
                    let before = p.children.len();
                    p.children.retain(|x| *x != c);
                    if p.children.len() == before {
                        Vec::new()
                    } else {
                        vec![c]
                    }
                }
            }
        };
        for c in removed {
            if let Some(g) = live_mut(&mut self.entities, c) {
                g.parent = None;
            }
        }
        Ok(())
    }

    /// Parent of a live entity.
    pub fn parent_of(&self, id: EntityId) -> Option<EntityId> {
        self.geometry(id)?.parent
    }

    /// Children of a live entity, in attach order.
    pub fn children_of(&self, id: EntityId) -> &[EntityId] {
        self.geometry(id).map(|g| g.children.as_slice()).unwrap_or_default()
    }

    fn is_ancestor(&self, candidate: EntityId, mut id: EntityId) -> bool {
        while let Some(p) = self.parent_of(id) {
            if p == candidate {
                return true;
            }
            id = p;
        }
        false
    }

    // --- queries ---

    /// Entities overlapping `rect`, each reported once.
    pub fn search(&self, rect: Rect) -> Vec<EntityId> {
        self.index.search(&to_bounds(rect), true)
    }

    /// Raw bucket contents for the cells under `rect`.
    ///
    /// May contain duplicates and entities that do not actually overlap; always a superset
    /// of [`search`](Self::search).
    pub fn search_raw(&self, rect: Rect) -> Vec<EntityId> {
        self.index.search(&to_bounds(rect), false)
    }

    /// Entities under a point, edges included, honoring polygon hit areas.
    ///
    /// Reports exactly the entities for which [`Geometry::is_at`] holds.
    pub fn hit(&self, pt: Point) -> Vec<EntityId> {
        self.index
            .query_point(pt.x, pt.y)
            .into_iter()
            .filter(|id| self.geometry(*id).is_some_and(|g| g.is_at(pt.x, pt.y)))
            .collect()
    }

    /// The topmost visible entity under a point.
    ///
    /// Ties on `z` go to the entity spawned later, following [`global_z`](Self::global_z).
    pub fn hit_test(&self, pt: Point) -> Option<EntityId> {
        self.hit(pt)
            .into_iter()
            .filter(|id| self.geometry(*id).is_some_and(Geometry::visible))
            .max_by_key(|id| self.global_z(*id))
    }

    /// Draw-order key: depth first, then spawn order.
    pub fn global_z(&self, id: EntityId) -> Option<(i32, u64)> {
        self.geometry(id).map(|g| (g.z, g.seq))
    }

    /// Visible entities overlapping `viewport`, back to front.
    pub fn draw_order(&self, viewport: Rect) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .search(viewport)
            .into_iter()
            .filter(|id| self.geometry(*id).is_some_and(Geometry::visible))
            .collect();
        ids.sort_by_key(|id| self.global_z(*id));
        ids
    }

    // --- render snapshots ---

    /// Properties changed since the last [`reset`](Self::reset).
    pub fn changes(&self, id: EntityId) -> Option<Changes> {
        let g = self.geometry(id)?;
        Some(g.snapshot().diff(&g.committed))
    }

    /// The last committed snapshot.
    pub fn committed(&self, id: EntityId) -> Option<Snapshot> {
        self.geometry(id).map(|g| g.committed)
    }

    /// Commit the current values as the new snapshot.
    pub fn reset(&mut self, id: EntityId) -> Result<(), StageError> {
        let g = self.get_mut(id)?;
        g.committed = g.snapshot();
        Ok(())
    }

    /// Commit every live entity.
    pub fn reset_all(&mut self) {
        for g in self.entities.iter_mut().flatten() {
            g.committed = g.snapshot();
        }
    }

    /// Take the queued change notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<StageEvent> {
        core::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage() -> Stage {
        Stage::new()
    }

    #[test]
    fn zero_cell_size_is_a_configuration_error() {
        let zero = StageConfig {
            cell_size: 0,
            ..StageConfig::default()
        };
        let err = Stage::with_config(&zero).unwrap_err();
        assert!(matches!(err, StageError::Index(_)));
        let small = StageConfig {
            cell_size: 32,
            ..StageConfig::default()
        };
        let ok = Stage::with_config(&small).unwrap();
        assert_eq!(ok.index().cell_size(), 32);
    }

    #[test]
    fn spawn_registers_with_index() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::rect(0.0, 0.0, 32.0, 32.0));
        assert!(stage.is_alive(a));
        assert_eq!(stage.len(), 1);
        assert_eq!(stage.search(Rect::new(0.0, 0.0, 10.0, 10.0)), [a]);
        assert_eq!(stage.index().range_of(a), Some(stage.geometry(a).unwrap().entry().range()));
    }

    #[test]
    fn spawned_ids_follow_creation_order() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::default());
        let b = stage.spawn(EntityDesc::default());
        assert!(a < b);
        assert_eq!(stage.ids().collect::<Vec<_>>(), [a, b]);
    }

    #[test]
    fn liveness_spawn_despawn_reuse() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::rect(0.0, 0.0, 1.0, 1.0));
        stage.despawn(a).unwrap();
        assert!(!stage.is_alive(a));
        assert_eq!(stage.despawn(a), Err(StageError::UnknownEntity(a)));
        let b = stage.spawn(EntityDesc::rect(0.0, 0.0, 1.0, 1.0));
        assert!(stage.is_alive(b));
        assert!(!stage.is_alive(a), "stale id must not alias the reused slot");
        if a.slot() == b.slot() {
            assert!(b.generation() > a.generation(), "generation must increase on reuse");
        }
        assert_eq!(stage.shift(a, 1.0, 0.0, 0.0, 0.0), Err(StageError::UnknownEntity(a)));
    }

    #[test]
    fn zero_shift_is_silent() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::rect(0.0, 0.0, 10.0, 10.0));
        stage.shift(a, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert!(stage.drain_events().is_empty());
        stage.set_position(a, 0.0, 0.0).unwrap();
        assert!(stage.drain_events().is_empty());
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::rect(5.0, 5.0, 10.0, 10.0));
        stage.shift(a, f64::NAN, 1.0, 0.0, 0.0).unwrap();
        stage.set_rotation(a, f64::INFINITY).unwrap();
        stage.set_origin(a, f64::NAN, 0.0).unwrap();
        let g = stage.geometry(a).unwrap();
        assert_eq!(g.pos(), Rect::new(5.0, 5.0, 15.0, 15.0));
        assert_eq!(g.rotation(), 0.0);
        assert_eq!(g.pivot(), Pivot::CENTER);
        assert!(stage.drain_events().is_empty());
    }

    #[test]
    fn negative_size_clamps_to_zero() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::rect(0.0, 0.0, 10.0, 10.0));
        stage.shift(a, 0.0, 0.0, -20.0, -5.0).unwrap();
        let g = stage.geometry(a).unwrap();
        assert_eq!((g.w(), g.h()), (0.0, 5.0));
        stage.set_size(a, -3.0, 4.0).unwrap();
        assert_eq!(stage.geometry(a).unwrap().w(), 0.0);
        assert_eq!(stage.search(Rect::new(0.0, 0.0, 1.0, 1.0)), [a], "still indexed");
    }

    #[test]
    fn move_toward_parses_tokens() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::rect(10.0, 10.0, 1.0, 1.0));
        stage.move_toward(a, "ne", 4.0).unwrap();
        let g = stage.geometry(a).unwrap();
        assert_eq!((g.x(), g.y()), (14.0, 6.0));
        assert_eq!(
            stage.move_toward(a, "up", 4.0),
            Err(StageError::InvalidDirection("up".into()))
        );
        let g = stage.geometry(a).unwrap();
        assert_eq!((g.x(), g.y()), (14.0, 6.0), "rejected move leaves geometry unchanged");
    }

    #[test]
    fn rotation_toggles_mbr_state() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::rect(0.0, 0.0, 10.0, 10.0));
        assert!(!stage.geometry(a).unwrap().is_rotated());
        stage.set_rotation(a, 45.0).unwrap();
        assert_eq!(
            stage.geometry(a).unwrap().mbr(),
            Some(Rect::new(-3.0, -3.0, 13.0, 13.0))
        );
        assert_eq!(
            stage.search(Rect::new(-2.5, -2.5, -2.0, -2.0)),
            [a],
            "index follows the rotated bounds"
        );
        stage.rotate_by(a, 315.0).unwrap();
        assert_eq!(stage.geometry(a).unwrap().mbr(), None, "a full turn is unrotated");
        assert!(stage.search(Rect::new(-2.5, -2.5, -2.0, -2.0)).is_empty());
    }

    #[test]
    fn origin_change_recomputes_mbr() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc {
            rotation: 90.0,
            ..EntityDesc::rect(0.0, 0.0, 20.0, 10.0)
        });
        stage.set_origin_keyword(a, "top left").unwrap();
        let mbr = stage.geometry(a).unwrap().mbr().unwrap();
        assert!((mbr.x0 - -10.0).abs() <= 1.0 && (mbr.y1 - 20.0).abs() <= 1.0);
        assert_eq!(
            stage.set_origin_keyword(a, "upper left"),
            Err(StageError::InvalidOrigin("upper left".into()))
        );
        stage.set_origin(a, 20.0, 10.0).unwrap();
        assert_eq!(
            stage.geometry(a).unwrap().origin_point(),
            Point::new(20.0, 10.0)
        );
    }

    #[test]
    fn moving_a_rotated_entity_moves_its_mbr() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc {
            rotation: 45.0,
            ..EntityDesc::rect(0.0, 0.0, 10.0, 10.0)
        });
        stage.shift(a, 100.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(
            stage.geometry(a).unwrap().mbr(),
            Some(Rect::new(97.0, -3.0, 113.0, 13.0))
        );
        assert_eq!(stage.index().bounds_of(a), Some(Bounds::from_xywh(97.0, -3.0, 16.0, 16.0)));
    }

    #[test]
    fn cascade_runs_depth_first_in_attach_order() {
        let mut stage = stage();
        let p = stage.spawn(EntityDesc::rect(0.0, 0.0, 10.0, 10.0));
        let c = stage.spawn(EntityDesc::rect(20.0, 0.0, 10.0, 10.0));
        let g = stage.spawn(EntityDesc::rect(40.0, 0.0, 10.0, 10.0));
        stage.attach(p, &[c]).unwrap();
        stage.attach(c, &[g]).unwrap();
        stage.drain_events();
        stage.move_dir(p, Direction::South, 7.0).unwrap();
        assert_eq!(stage.geometry(c).unwrap().y(), 7.0);
        assert_eq!(stage.geometry(g).unwrap().y(), 7.0);
        let order: Vec<_> = stage.drain_events().into_iter().map(|e| e.entity).collect();
        assert_eq!(order, [p, c, g], "parent commits before its children");
    }

    #[test]
    fn rotation_is_not_cascaded() {
        let mut stage = stage();
        let p = stage.spawn(EntityDesc::rect(0.0, 0.0, 10.0, 10.0));
        let c = stage.spawn(EntityDesc::rect(20.0, 0.0, 10.0, 10.0));
        stage.attach(p, &[c]).unwrap();
        stage.set_rotation(p, 30.0).unwrap();
        let child = stage.geometry(c).unwrap();
        assert_eq!(child.rotation(), 0.0);
        assert_eq!(child.pos(), Rect::new(20.0, 0.0, 30.0, 10.0));
    }

    #[test]
    fn repeated_moves_in_one_frame_shift_children_once_each() {
        let mut stage = stage();
        let p = stage.spawn(EntityDesc::rect(0.0, 0.0, 10.0, 10.0));
        let c = stage.spawn(EntityDesc::rect(50.0, 50.0, 10.0, 10.0));
        stage.attach(p, &[c]).unwrap();
        stage.shift(p, 5.0, 0.0, 0.0, 0.0).unwrap();
        stage.shift(p, 5.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(stage.geometry(c).unwrap().x(), 60.0);
        // A resize alone does not move children.
        stage.set_size(p, 30.0, 30.0).unwrap();
        assert_eq!(stage.geometry(c).unwrap().x(), 60.0);
    }

    #[test]
    fn attach_rejects_cycles_and_self() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::default());
        let b = stage.spawn(EntityDesc::default());
        let c = stage.spawn(EntityDesc::default());
        stage.attach(a, &[b]).unwrap();
        stage.attach(b, &[c]).unwrap();
        assert_eq!(
            stage.attach(c, &[a]),
            Err(StageError::AttachCycle {
                parent: c,
                child: a
            })
        );
        assert_eq!(stage.attach(a, &[a]), Err(StageError::SelfAttach(a)));
        assert!(stage.children_of(c).is_empty());
    }

    #[test]
    fn attaching_elsewhere_reparents() {
        let mut stage = stage();
        let p1 = stage.spawn(EntityDesc::rect(0.0, 0.0, 1.0, 1.0));
        let p2 = stage.spawn(EntityDesc::rect(0.0, 0.0, 1.0, 1.0));
        let c = stage.spawn(EntityDesc::rect(0.0, 0.0, 1.0, 1.0));
        stage.attach(p1, &[c, c]).unwrap();
        assert_eq!(stage.children_of(p1), &[c], "no duplicate children");
        stage.attach(p2, &[c]).unwrap();
        assert!(stage.children_of(p1).is_empty());
        assert_eq!(stage.parent_of(c), Some(p2));
        stage.shift(p1, 10.0, 0.0, 0.0, 0.0).unwrap();
        stage.shift(p2, 3.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(stage.geometry(c).unwrap().x(), 3.0, "only the last parent moves it");
    }

    #[test]
    fn detach_one_or_all() {
        let mut stage = stage();
        let p = stage.spawn(EntityDesc::default());
        let a = stage.spawn(EntityDesc::default());
        let b = stage.spawn(EntityDesc::default());
        stage.attach(p, &[a, b]).unwrap();
        stage.detach(p, Some(a)).unwrap();
        assert_eq!(stage.children_of(p), &[b]);
        assert_eq!(stage.parent_of(a), None);
        stage.detach(p, Some(a)).unwrap();
        stage.detach(p, None).unwrap();
        assert!(stage.children_of(p).is_empty());
        assert_eq!(stage.parent_of(b), None);
    }

    #[test]
    fn despawn_unlinks_but_keeps_children() {
        let mut stage = stage();
        let root = stage.spawn(EntityDesc::rect(0.0, 0.0, 4.0, 4.0));
        let mid = stage.spawn(EntityDesc::rect(0.0, 0.0, 4.0, 4.0));
        let leaf = stage.spawn(EntityDesc::rect(0.0, 0.0, 4.0, 4.0));
        stage.attach(root, &[mid]).unwrap();
        stage.attach(mid, &[leaf]).unwrap();
        stage.despawn(mid).unwrap();
        assert!(stage.children_of(root).is_empty());
        assert!(stage.is_alive(leaf));
        assert_eq!(stage.parent_of(leaf), None);
        assert_eq!(stage.search(Rect::new(0.0, 0.0, 1.0, 1.0)), [root, leaf]);
        stage.shift(root, 100.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(stage.geometry(leaf).unwrap().x(), 0.0);
    }

    #[test]
    fn render_snapshot_commit_cycle() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::rect(0.0, 0.0, 10.0, 10.0));
        assert_eq!(stage.changes(a), Some(Changes::empty()));
        stage.shift(a, 3.0, 0.0, 0.0, 2.0).unwrap();
        stage.set_alpha(a, 0.5).unwrap();
        stage.set_flip(a, FlipFlags::X).unwrap();
        assert_eq!(
            stage.changes(a),
            Some(Changes::X | Changes::H | Changes::ALPHA | Changes::FLIP_X)
        );
        assert_eq!(stage.committed(a).unwrap().x, 0.0);
        stage.reset(a).unwrap();
        assert_eq!(stage.changes(a), Some(Changes::empty()));
        assert_eq!(stage.committed(a).unwrap().x, 3.0);
        stage.set_z(a, 4).unwrap();
        stage.reset_all();
        assert_eq!(stage.committed(a).unwrap().z, 4);
    }

    #[test]
    fn events_report_kind() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::rect(0.0, 0.0, 10.0, 10.0));
        stage.set_size(a, 20.0, 10.0).unwrap();
        stage.set_rotation(a, 10.0).unwrap();
        let kinds: Vec<_> = stage.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, [EventKind::Moved, EventKind::Resized, EventKind::Rotated]);
        assert!(stage.drain_events().is_empty());
    }

    #[test]
    fn hit_test_prefers_depth_then_newer() {
        let mut stage = stage();
        let back = stage.spawn(EntityDesc {
            z: 5,
            ..EntityDesc::rect(0.0, 0.0, 50.0, 50.0)
        });
        let front = stage.spawn(EntityDesc::rect(0.0, 0.0, 50.0, 50.0));
        assert_eq!(stage.hit_test(Point::new(10.0, 10.0)), Some(back));
        stage.set_z(front, 5).unwrap();
        assert_eq!(stage.hit_test(Point::new(10.0, 10.0)), Some(front), "newer wins ties");
        stage.set_visible(front, false).unwrap();
        assert_eq!(stage.hit_test(Point::new(10.0, 10.0)), Some(back));
        assert_eq!(stage.draw_order(Rect::new(0.0, 0.0, 100.0, 100.0)), [back]);
    }

    #[test]
    fn hit_includes_right_and_bottom_edges() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::rect(0.0, 0.0, 10.0, 10.0));
        let b = stage.spawn(EntityDesc::rect(0.0, 0.0, 64.0, 64.0));
        for pt in [Point::new(10.0, 10.0), Point::new(10.0, 3.0), Point::new(0.0, 0.0)] {
            assert!(stage.geometry(a).unwrap().is_at(pt.x, pt.y));
            assert_eq!(stage.hit(pt), [a, b], "edge point {pt:?}");
        }
        assert_eq!(stage.hit(Point::new(64.0, 64.0)), [b], "corner on a cell boundary");
        assert_eq!(stage.hit_test(Point::new(10.0, 10.0)), Some(b));
        assert!(stage.hit(Point::new(64.5, 10.0)).is_empty());
    }

    #[test]
    fn extreme_coordinates_stay_indexed() {
        let mut stage = stage();
        let far = stage.spawn(EntityDesc::rect(-1e300, 0.0, 1.0, 1.0));
        stage.shift(far, -1e300, 0.0, 0.0, 0.0).unwrap();
        assert!(stage.index().contains(far));
        let huge = stage.spawn(EntityDesc::rect(0.0, 0.0, 1e9, 1e9));
        assert_eq!(stage.index().oversized_len(), 1);
        assert_eq!(stage.search(Rect::new(5.0, 5.0, 6.0, 6.0)), [huge]);
        stage.set_size(huge, 10.0, 10.0).unwrap();
        assert_eq!(stage.index().oversized_len(), 0);
        assert_eq!(stage.search(Rect::new(5.0, 5.0, 6.0, 6.0)), [huge]);
    }

    #[test]
    fn hit_area_narrows_point_queries() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc::rect(100.0, 100.0, 100.0, 100.0));
        let tri = Polygon::new([
            Point::new(50.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ]);
        stage.set_hit_area(a, Some(tri)).unwrap();
        assert_eq!(stage.hit(Point::new(150.0, 150.0)), [a]);
        assert!(stage.hit(Point::new(101.0, 101.0)).is_empty(), "outside the triangle");
        assert_eq!(
            stage.search(Rect::from_origin_size((101.0, 101.0), (1.0, 1.0))),
            [a],
            "rectangle queries use the box"
        );
    }

    #[test]
    fn draw_order_sorts_back_to_front() {
        let mut stage = stage();
        let a = stage.spawn(EntityDesc {
            z: 2,
            ..EntityDesc::rect(0.0, 0.0, 10.0, 10.0)
        });
        let b = stage.spawn(EntityDesc::rect(5.0, 5.0, 10.0, 10.0));
        let c = stage.spawn(EntityDesc {
            z: 2,
            ..EntityDesc::rect(500.0, 500.0, 10.0, 10.0)
        });
        assert_eq!(stage.draw_order(Rect::new(0.0, 0.0, 600.0, 600.0)), [b, a, c]);
        assert_eq!(stage.global_z(a), Some((2, 1)));
        assert_eq!(stage.global_z(c), Some((2, 3)));
    }
}
