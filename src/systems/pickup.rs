//! Timed pickups: collected on avatar contact, otherwise they expire.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::*;
use crate::round::RoundContext;
use crate::spatial::{living_avatar, overlaps_avatar};
use crate::systems::combat::{apply_damage, heal};
use crate::systems::lifecycle::kill;

pub const HEAL_AMOUNT: i32 = 100;
pub const FLAME_REFILL: i32 = 5;
pub const FUNGUS_DAMAGE: i32 = 20;

/// Score change when the pickup is collected.
pub fn score_for(kind: PickupKind) -> i64 {
    match kind {
        PickupKind::RestoreHealth => 250,
        PickupKind::FlameCharges => 300,
        PickupKind::ExtraLife => 500,
        PickupKind::Fungus => -50,
    }
}

pub fn step(world: &mut World, pickup: Entity, kind: PickupKind, round: &mut RoundContext) {
    if overlaps_avatar(world, pickup) {
        if let Some(avatar) = living_avatar(world) {
            collect(world, avatar, kind, round);
        }
        kill(world, pickup);
        return;
    }

    let expired = match world.get_mut::<Lifetime>(pickup) {
        Some(mut lifetime) => {
            lifetime.0 -= 1;
            lifetime.0 <= 0
        }
        None => true,
    };
    if expired {
        kill(world, pickup);
    }
}

fn collect(world: &mut World, avatar: Entity, kind: PickupKind, round: &mut RoundContext) {
    match kind {
        PickupKind::RestoreHealth => heal(world, avatar, HEAL_AMOUNT),
        PickupKind::FlameCharges => {
            if let Some(mut armament) = world.get_mut::<Armament>(avatar) {
                armament.flame_charges += FLAME_REFILL;
            }
        }
        PickupKind::ExtraLife => round.lives += 1,
        PickupKind::Fungus => {
            apply_damage(world, avatar, FUNGUS_DAMAGE, round);
        }
    }
    round.add_score(score_for(kind));
    debug!("collected {:?}, score {}", kind, round.score);
}
