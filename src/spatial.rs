//! Proximity queries over the entity roster.
//!
//! The arena holds at most a few hundred entities, so every query is a
//! linear scan in roster order. Scan order is part of the contract: when two
//! candidates tie, the one earlier in the roster wins.

use bevy_ecs::prelude::*;

use crate::components::{EntityKind, Liveness, Position};
use crate::geometry::{angle_between, distance_from_center, ARENA_RADIUS, BLOCKING_RADIUS, CONTACT_RADIUS};

/// Non-avatar entities in the order they were spawned.
///
/// Appended to mid-tick; pruned only by the end-of-tick reap.
#[derive(Resource, Debug, Default, Clone)]
pub struct Roster(pub Vec<Entity>);

impl Roster {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Entity> {
        self.0.get(index).copied()
    }
}

/// The avatar entity, held outside the roster.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct AvatarHandle(pub Option<Entity>);

/// Snapshot of a roster entry used by the scans below.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub kind: EntityKind,
    pub position: Position,
}

pub fn is_alive(world: &World, entity: Entity) -> bool {
    world.get::<Liveness>(entity).is_some_and(Liveness::is_alive)
}

pub fn position_of(world: &World, entity: Entity) -> Option<Position> {
    world.get::<Position>(entity).copied()
}

pub fn kind_of(world: &World, entity: Entity) -> Option<EntityKind> {
    world.get::<EntityKind>(entity).copied()
}

pub fn overlaps(a: Position, b: Position) -> bool {
    a.distance_to(&b) <= CONTACT_RADIUS
}

/// The living avatar, if any.
pub fn living_avatar(world: &World) -> Option<Entity> {
    let avatar = world.get_resource::<AvatarHandle>()?.0?;
    is_alive(world, avatar).then_some(avatar)
}

/// Live roster entries in roster order.
pub fn live_entries(world: &World) -> impl Iterator<Item = SpatialEntry> + '_ {
    world
        .get_resource::<Roster>()
        .into_iter()
        .flat_map(|roster| roster.0.iter().copied())
        .filter(move |&entity| is_alive(world, entity))
        .filter_map(move |entity| {
            Some(SpatialEntry {
                entity,
                kind: kind_of(world, entity)?,
                position: position_of(world, entity)?,
            })
        })
}

/// Blocked when on or past the rim, or too close to a live obstacle.
pub fn is_movement_blocked_at(world: &World, point: Position) -> bool {
    if distance_from_center(point) >= ARENA_RADIUS {
        return true;
    }
    live_entries(world)
        .any(|e| e.kind.blocks_movement() && e.position.distance_to(&point) <= BLOCKING_RADIUS)
}

/// Whether any live entity matching `filter` overlaps `point`.
pub fn any_overlap_at(world: &World, point: Position, filter: impl Fn(EntityKind) -> bool) -> bool {
    live_entries(world).any(|e| filter(e.kind) && overlaps(e.position, point))
}

/// Closest live entity to `who` within `radius` that matches `filter`.
///
/// Excludes `who` itself. Ties keep the earlier roster entry.
pub fn nearest_within(
    world: &World,
    who: Entity,
    radius: f32,
    filter: impl Fn(EntityKind) -> bool,
) -> Option<(Entity, f32)> {
    let origin = position_of(world, who)?;
    let mut best: Option<(Entity, f32)> = None;
    for entry in live_entries(world) {
        if entry.entity == who || !filter(entry.kind) {
            continue;
        }
        let d = entry.position.distance_to(&origin);
        if d > radius {
            continue;
        }
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((entry.entity, d));
        }
    }
    best
}

pub fn nearest_edible_within(world: &World, who: Entity, radius: f32) -> Option<Entity> {
    nearest_within(world, who, radius, EntityKind::is_edible).map(|(e, _)| e)
}

/// Bearing from `who` to the nearest edible within `radius`.
pub fn bearing_to_nearest_edible(world: &World, who: Entity, radius: f32) -> Option<f32> {
    let target = nearest_edible_within(world, who, radius)?;
    Some(angle_between(position_of(world, who)?, position_of(world, target)?))
}

/// First live edible (roster order) overlapping `who`.
pub fn first_overlapping_edible(world: &World, who: Entity) -> Option<Entity> {
    let origin = position_of(world, who)?;
    live_entries(world)
        .find(|e| e.entity != who && e.kind.is_edible() && overlaps(e.position, origin))
        .map(|e| e.entity)
}

/// Nearest live damageable entity overlapping `who`.
pub fn first_damageable_overlap(world: &World, who: Entity) -> Option<Entity> {
    nearest_within(world, who, CONTACT_RADIUS, EntityKind::is_damageable).map(|(e, _)| e)
}

/// Bearing from `who` to the living avatar when it is within `radius`.
pub fn avatar_within(world: &World, who: Entity, radius: f32) -> Option<f32> {
    let avatar = living_avatar(world)?;
    let origin = position_of(world, who)?;
    let target = position_of(world, avatar)?;
    (origin.distance_to(&target) <= radius).then(|| angle_between(origin, target))
}

pub fn overlaps_avatar(world: &World, who: Entity) -> bool {
    avatar_within(world, who, CONTACT_RADIUS).is_some()
}
