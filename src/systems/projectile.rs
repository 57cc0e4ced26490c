//! Projectiles fly straight until they hit something or run out of range.

use bevy_ecs::prelude::*;

use crate::components::*;
use crate::geometry::position_in_direction;
use crate::round::RoundContext;
use crate::spatial::first_damageable_overlap;
use crate::systems::combat::apply_damage;
use crate::systems::lifecycle::kill;

/// Distance covered per tick.
pub const PROJECTILE_STEP: f32 = 8.0;

pub fn step(world: &mut World, projectile: Entity, kind: ProjectileKind, round: &mut RoundContext) {
    if let Some(target) = first_damageable_overlap(world, projectile) {
        apply_damage(world, target, kind.damage(), round);
        kill(world, projectile);
        return;
    }

    let Some(heading) = world.get::<Heading>(projectile).map(Heading::degrees) else {
        return;
    };
    if let Some(mut pos) = world.get_mut::<Position>(projectile) {
        *pos = position_in_direction(*pos, heading, PROJECTILE_STEP);
    }

    let spent = match world.get_mut::<TravelBudget>(projectile) {
        Some(mut budget) => {
            budget.0 -= PROJECTILE_STEP as i32;
            budget.0 <= 0
        }
        None => true,
    };
    if spent {
        kill(world, projectile);
    }
}
