//! Entity factories, arena seeding and per-tick random pickups.

use bevy_ecs::prelude::*;
use log::{debug, info, warn};

use crate::components::*;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::geometry::{random_point_in_ring, random_point_near_center, ARENA_RADIUS, SPRITE_WIDTH};
use crate::rng::{with_rng, SimRng};
use crate::spatial::any_overlap_at;
use crate::systems::lifecycle::spawn_entity;

// ============================================================================
// FACTORIES
// ============================================================================

pub fn spawn_microbe(world: &mut World, kind: MicrobeKind, position: Position) -> Entity {
    let entity = spawn_entity(world, MicrobeBundle::new(kind, position));
    debug!("spawned {:?} {:?} at ({:.1}, {:.1})", kind, entity, position.x, position.y);
    entity
}

pub fn spawn_food(world: &mut World, position: Position) -> Entity {
    spawn_entity(world, EntityBundle::new(EntityKind::Food, position, 0.0))
}

pub fn spawn_dirt(world: &mut World, position: Position) -> Entity {
    spawn_entity(world, EntityBundle::new(EntityKind::Dirt, position, 0.0))
}

pub fn spawn_pit(world: &mut World, position: Position, counts: [u32; 3]) -> Entity {
    spawn_entity(world, PitBundle::new(position, counts))
}

pub fn spawn_pickup(world: &mut World, kind: PickupKind, position: Position, lifetime: i32) -> Entity {
    let entity = spawn_entity(world, PickupBundle::new(kind, position, lifetime));
    debug!("spawned {:?} pickup {:?} for {} ticks", kind, entity, lifetime);
    entity
}

pub fn spawn_projectile(world: &mut World, kind: ProjectileKind, position: Position, heading: f32) -> Entity {
    spawn_entity(world, ProjectileBundle::new(kind, position, heading))
}

// ============================================================================
// SEEDING
// ============================================================================

/// Counts of what [`seed_arena`] placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub pits: usize,
    pub food: usize,
    pub dirt: usize,
}

/// Populates the arena for `level`: pits first, then food, then dirt.
///
/// Pits keep clear of each other, food keeps clear of pits and food, and
/// dirt keeps clear of everything that does not block.
pub fn seed_arena(world: &mut World, level: u32, config: &SimConfig) -> SimResult<SeedReport> {
    let attempts = config.max_placement_attempts;

    let pits = place(
        world,
        "pits",
        level as usize,
        config,
        |world, rng| {
            let p = random_point_in_ring(rng, config.pit_min_radius, config.placement_radius, attempts)?;
            (!any_overlap_at(world, p, |k| k == EntityKind::Pit)).then_some(p)
        },
        |world, p| spawn_pit(world, p, config.pit_contents),
    )?;

    let food = place(
        world,
        "food",
        config.food_count(level),
        config,
        |world, rng| {
            let p = random_point_near_center(rng, config.placement_radius, attempts)?;
            (!any_overlap_at(world, p, |k| matches!(k, EntityKind::Pit | EntityKind::Food))).then_some(p)
        },
        spawn_food,
    )?;

    let dirt = place(
        world,
        "dirt",
        config.dirt_count(level),
        config,
        |world, rng| {
            let p = random_point_near_center(rng, config.placement_radius, attempts)?;
            (!any_overlap_at(world, p, |k| !k.blocks_movement())).then_some(p)
        },
        spawn_dirt,
    )?;

    let report = SeedReport { pits, food, dirt };
    info!(
        "seeded level {}: {} pits, {} food, {} dirt",
        level, report.pits, report.food, report.dirt
    );
    Ok(report)
}

/// Places `requested` items one at a time, giving each a bounded number of
/// candidate draws.
fn place(
    world: &mut World,
    what: &'static str,
    requested: usize,
    config: &SimConfig,
    candidate: impl Fn(&World, &mut SimRng) -> Option<Position>,
    spawn: impl Fn(&mut World, Position) -> Entity,
) -> SimResult<usize> {
    let mut rng = world
        .remove_resource::<SimRng>()
        .unwrap_or_else(|| SimRng::from_seed_option(config.seed));
    let bound = config.max_placement_attempts;

    let mut result = Ok(requested);
    for placed in 0..requested {
        let point = (1..=bound).find_map(|attempt| {
            if attempt == bound / 2 {
                warn!("placing {what}: {attempt} draws for item {}", placed + 1);
            }
            candidate(world, &mut rng)
        });
        match point {
            Some(p) => {
                spawn(world, p);
            }
            None => {
                result = Err(SimError::PlacementExhausted {
                    what,
                    placed,
                    requested,
                    attempts: bound,
                });
                break;
            }
        }
    }

    world.insert_resource(rng);
    result
}

// ============================================================================
// PER-TICK PICKUPS
// ============================================================================

/// Pickups appear just inside the rim where the avatar can reach them.
pub fn pickup_ring() -> (f32, f32) {
    (ARENA_RADIUS - SPRITE_WIDTH, ARENA_RADIUS - 1.0)
}

/// Common heal, common flame, rare extra life.
pub fn roll_pickup_kind(rng: &mut SimRng) -> PickupKind {
    match rng.rand_int(1, 10) {
        1..=6 => PickupKind::RestoreHealth,
        7..=9 => PickupKind::FlameCharges,
        _ => PickupKind::ExtraLife,
    }
}

/// Rolls this tick's random pickups. Odds grow longer with the level.
pub fn spawn_pickups(world: &mut World, level: u32) {
    let Some(config) = world.get_resource::<SimConfig>().cloned() else {
        return;
    };
    if !config.random_pickups {
        return;
    }
    let (min_r, max_r) = pickup_ring();
    let attempts = config.max_placement_attempts;

    let rolls = with_rng(world, |rng| {
        let lifetime = rng
            .rand_int(0, config.pickup_lifetime_ceiling(level))
            .max(config.min_pickup_lifetime);
        let mut rolls = Vec::new();
        if rng.one_in(config.fungus_odds(level)) {
            rolls.push(PickupKind::Fungus);
        }
        if rng.one_in(config.pickup_odds(level)) {
            rolls.push(roll_pickup_kind(rng));
        }
        rolls
            .into_iter()
            .filter_map(|kind| Some((kind, random_point_in_ring(rng, min_r, max_r, attempts)?)))
            .map(|(kind, p)| (kind, p, lifetime))
            .collect::<Vec<_>>()
    });

    for (kind, position, lifetime) in rolls {
        spawn_pickup(world, kind, position, lifetime);
    }
}
