//! Per-kind behaviors and the shared machinery they use.
//!
//! Within a tick entities act one at a time in roster order, so each
//! behavior is a plain function over `&mut World` rather than a bevy system.
//! Only the end-of-tick sweep (`lifecycle::reap_dead_system`) runs through a
//! `Schedule`.
//!
//! ## Tick order
//! 1. `spawning::spawn_pickups` - random pickups for this tick
//! 2. `avatar::step` - applies the pending command
//! 3. [`step_entity`] for every roster entry present at tick start
//! 4. `lifecycle::reap_dead_system` - despawns what died

pub mod avatar;
pub mod combat;
pub mod lifecycle;
pub mod microbe;
pub mod pickup;
pub mod pit;
pub mod projectile;
pub mod serialization;
pub mod spawning;

pub use avatar::Command;
pub use combat::{apply_damage, DamageOutcome};
pub use lifecycle::{kill, prevents_round_completion, reap_dead_system, round_blocked, spawn_entity, SimTick};
pub use serialization::*;
pub use spawning::{seed_arena, spawn_pickups, SeedReport};

use bevy_ecs::prelude::*;

use crate::components::EntityKind;
use crate::round::RoundContext;
use crate::spatial::{is_alive, kind_of};

/// Runs one entity's behavior for this tick. Dead entities are skipped.
pub fn step_entity(world: &mut World, entity: Entity, round: &mut RoundContext) {
    if !is_alive(world, entity) {
        return;
    }
    match kind_of(world, entity) {
        Some(EntityKind::Microbe(kind)) => microbe::step(world, entity, kind, round),
        Some(EntityKind::Pit) => pit::step(world, entity),
        Some(EntityKind::Pickup(kind)) => pickup::step(world, entity, kind, round),
        Some(EntityKind::Projectile(kind)) => projectile::step(world, entity, kind, round),
        // Food and dirt are inert; the avatar is driven by input.
        Some(EntityKind::Food | EntityKind::Dirt | EntityKind::Avatar) | None => {}
    }
}
