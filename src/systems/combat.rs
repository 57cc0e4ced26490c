//! Damage resolution.
//!
//! Entities with a `Health` component lose hit points and die on the hit
//! that empties them. Damageable entities without one (dirt, pickups) are
//! destroyed by any hit. Only the killing hit triggers death effects.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::*;
use crate::rng::with_rng;
use crate::round::RoundContext;
use crate::spatial::{is_alive, kind_of, position_of};
use crate::systems::lifecycle::kill;
use crate::systems::spawning::spawn_food;

/// Score for destroying a microbe.
pub const MICROBE_KILL_SCORE: i64 = 100;
/// A killed microbe leaves food behind with probability 1 in this.
const FOOD_DROP_ODDS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target was already dead or cannot be damaged.
    Ignored,
    Hurt,
    Killed,
}

/// Applies `amount` damage to `target`.
///
/// The avatar takes damage from microbes and fungus even though it is not a
/// projectile target.
pub fn apply_damage(world: &mut World, target: Entity, amount: i32, round: &mut RoundContext) -> DamageOutcome {
    if !is_alive(world, target) {
        return DamageOutcome::Ignored;
    }
    let Some(kind) = kind_of(world, target) else {
        return DamageOutcome::Ignored;
    };
    if !kind.is_damageable() && kind != EntityKind::Avatar {
        return DamageOutcome::Ignored;
    }

    let emptied = match world.get_mut::<Health>(target) {
        Some(mut health) => health.damage(amount),
        None => true,
    };
    if !emptied {
        return DamageOutcome::Hurt;
    }
    if !kill(world, target) {
        return DamageOutcome::Ignored;
    }

    if let EntityKind::Microbe(microbe) = kind {
        on_microbe_killed(world, target, microbe, round);
    }
    DamageOutcome::Killed
}

fn on_microbe_killed(world: &mut World, microbe: Entity, kind: MicrobeKind, round: &mut RoundContext) {
    round.add_score(MICROBE_KILL_SCORE);
    let drops_food = with_rng(world, |rng| rng.one_in(FOOD_DROP_ODDS));
    debug!("{:?} {:?} destroyed, score {}", kind, microbe, round.score);
    if drops_food {
        if let Some(pos) = position_of(world, microbe) {
            spawn_food(world, pos);
        }
    }
}

/// Restores avatar hit points up to its cap.
pub fn heal(world: &mut World, target: Entity, amount: i32) {
    if !is_alive(world, target) {
        return;
    }
    if let Some(mut health) = world.get_mut::<Health>(target) {
        health.heal(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::rng::SimRng;
    use crate::spatial::{live_entries, Roster};
    use crate::systems::lifecycle::spawn_entity;

    fn setup_world() -> World {
        let mut world = World::new();
        world.insert_resource(Roster::default());
        world.insert_resource(SimConfig::default());
        world.insert_resource(SimRng::seeded(7));
        world
    }

    #[test]
    fn test_microbe_dies_once_and_scores_once() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        let microbe = spawn_entity(&mut world, MicrobeBundle::new(MicrobeKind::Patroller, Position::new(50.0, 50.0)));

        assert_eq!(apply_damage(&mut world, microbe, 2, &mut round), DamageOutcome::Hurt);
        assert_eq!(round.score, 0);
        assert_eq!(apply_damage(&mut world, microbe, 2, &mut round), DamageOutcome::Killed);
        assert_eq!(round.score, MICROBE_KILL_SCORE);
        assert_eq!(apply_damage(&mut world, microbe, 2, &mut round), DamageOutcome::Ignored);
        assert_eq!(round.score, MICROBE_KILL_SCORE);
    }

    #[test]
    fn test_food_drop_happens_at_microbe_position() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        let mut drops = 0;
        for _ in 0..40 {
            let pos = Position::new(60.0, 70.0);
            let microbe = spawn_entity(&mut world, MicrobeBundle::new(MicrobeKind::Tracker, pos));
            let before = live_entries(&world).filter(|e| e.kind.is_edible()).count();
            apply_damage(&mut world, microbe, 100, &mut round);
            let after: Vec<_> = live_entries(&world).filter(|e| e.kind.is_edible()).collect();
            if after.len() > before {
                drops += 1;
                assert_eq!(after.last().unwrap().position, pos);
            }
        }
        assert!(drops > 0 && drops < 40);
    }

    #[test]
    fn test_dirt_destroyed_by_any_hit() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        let dirt = spawn_entity(&mut world, EntityBundle::new(EntityKind::Dirt, Position::new(10.0, 10.0), 0.0));
        assert_eq!(apply_damage(&mut world, dirt, 1, &mut round), DamageOutcome::Killed);
        assert!(!is_alive(&world, dirt));
        assert_eq!(round.score, 0);
    }

    #[test]
    fn test_food_and_pits_ignore_damage() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        let food = spawn_entity(&mut world, EntityBundle::new(EntityKind::Food, Position::new(10.0, 10.0), 0.0));
        let pit = spawn_entity(&mut world, PitBundle::new(Position::new(20.0, 10.0), [1, 0, 0]));
        assert_eq!(apply_damage(&mut world, food, 10, &mut round), DamageOutcome::Ignored);
        assert_eq!(apply_damage(&mut world, pit, 10, &mut round), DamageOutcome::Ignored);
        assert!(is_alive(&world, food) && is_alive(&world, pit));
    }

    #[test]
    fn test_heal_respects_cap() {
        let mut world = setup_world();
        let armament = Armament { spray_charges: 20, flame_charges: 5 };
        let avatar = world
            .spawn(AvatarBundle::new(Position::new(0.0, 128.0), 0.0, 100, armament))
            .id();
        let mut round = RoundContext::new(1);
        apply_damage(&mut world, avatar, 30, &mut round);
        heal(&mut world, avatar, 100);
        assert_eq!(world.get::<Health>(avatar).unwrap().current, 100);
    }
}
