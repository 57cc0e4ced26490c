//! Microbe behavior: feeding, division and the three movement strategies.
//!
//! Every variant shares one metabolism step, tried in priority order:
//! bite the avatar, divide when well fed, eat an overlapping edible. The
//! variants differ only in how they move when metabolism did nothing.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::*;
use crate::geometry::{position_in_direction, ARENA_CENTER, SPRITE_WIDTH};
use crate::rng::with_rng;
use crate::round::RoundContext;
use crate::spatial::{
    avatar_within, bearing_to_nearest_edible, first_overlapping_edible, is_movement_blocked_at, living_avatar,
    overlaps_avatar, position_of,
};
use crate::systems::combat::apply_damage;
use crate::systems::lifecycle::kill;
use crate::systems::spawning::spawn_microbe;

/// Food eaten before a microbe divides.
pub const DIVISION_THRESHOLD: u32 = 3;
/// Steps taken before reconsidering the heading.
pub const PLAN_LENGTH: u32 = 10;
pub const PATROL_STEP: f32 = 3.0;
pub const EDIBLE_SENSE_RADIUS: f32 = 128.0;
pub const HUNTER_SENSE_RADIUS: f32 = 72.0;
pub const TRACKER_SENSE_RADIUS: f32 = 256.0;
pub const TRACKER_STEP: f32 = 2.0;
const TRACKER_TURN_ATTEMPTS: usize = 10;
const TRACKER_TURN_STEP: f32 = 10.0;

/// What the shared metabolism step did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metabolism {
    BitAvatar,
    Divided,
    Ate,
    Idle,
}

pub fn step(world: &mut World, microbe: Entity, kind: MicrobeKind, round: &mut RoundContext) {
    match kind {
        MicrobeKind::Patroller => {
            if metabolize(world, microbe, kind, round) == Metabolism::Idle {
                patrol(world, microbe);
            }
        }
        MicrobeKind::Hunter => {
            if !overlaps_avatar(world, microbe) {
                if let Some(bearing) = avatar_within(world, microbe, HUNTER_SENSE_RADIUS) {
                    face(world, microbe, bearing);
                    if try_advance(world, microbe, PATROL_STEP) {
                        return;
                    }
                }
            }
            if metabolize(world, microbe, kind, round) == Metabolism::Idle {
                patrol(world, microbe);
            }
        }
        MicrobeKind::Tracker => {
            if metabolize(world, microbe, kind, round) == Metabolism::BitAvatar {
                return;
            }
            if let Some(bearing) = avatar_within(world, microbe, TRACKER_SENSE_RADIUS) {
                face(world, microbe, bearing);
                bump_and_turn(world, microbe);
            }
        }
    }
}

/// Contact damage, then division, then eating. At most one happens.
pub fn metabolize(world: &mut World, microbe: Entity, kind: MicrobeKind, round: &mut RoundContext) -> Metabolism {
    if overlaps_avatar(world, microbe) {
        if let Some(avatar) = living_avatar(world) {
            apply_damage(world, avatar, kind.contact_damage(), round);
        }
        return Metabolism::BitAvatar;
    }

    let food = world.get::<MicrobeState>(microbe).map_or(0, |s| s.food);
    if food >= DIVISION_THRESHOLD {
        if let Some(pos) = position_of(world, microbe) {
            let child = spawn_microbe(world, kind, offspring_position(pos));
            debug!("{:?} divided into {:?}", microbe, child);
        }
        if let Some(mut state) = world.get_mut::<MicrobeState>(microbe) {
            state.food = 0;
        }
        return Metabolism::Divided;
    }

    if let Some(edible) = first_overlapping_edible(world, microbe) {
        if kill(world, edible) {
            if let Some(mut state) = world.get_mut::<MicrobeState>(microbe) {
                state.food += 1;
            }
            return Metabolism::Ate;
        }
    }

    Metabolism::Idle
}

/// Half a sprite toward the center on each axis that is off-center.
pub fn offspring_position(parent: Position) -> Position {
    let toward = |v: f32, c: f32| {
        let offset = SPRITE_WIDTH / 2.0;
        if v < c {
            v + offset
        } else if v > c {
            v - offset
        } else {
            v
        }
    };
    Position::new(toward(parent.x, ARENA_CENTER.x), toward(parent.y, ARENA_CENTER.y))
}

fn face(world: &mut World, microbe: Entity, bearing: f32) {
    if let Some(mut heading) = world.get_mut::<Heading>(microbe) {
        heading.set(bearing);
    }
}

/// Moves `dist` along the heading unless the destination is blocked.
fn try_advance(world: &mut World, microbe: Entity, dist: f32) -> bool {
    let (Some(pos), Some(heading)) = (position_of(world, microbe), world.get::<Heading>(microbe)) else {
        return false;
    };
    let target = position_in_direction(pos, heading.degrees(), dist);
    if is_movement_blocked_at(world, target) {
        return false;
    }
    if let Some(mut p) = world.get_mut::<Position>(microbe) {
        *p = target;
    }
    true
}

/// Follows the current plan, replanning when it runs out or hits something.
fn patrol(world: &mut World, microbe: Entity) {
    let plan = world.get::<MicrobeState>(microbe).map_or(0, |s| s.movement_plan);
    if plan == 0 {
        replan(world, microbe);
        return;
    }
    set_plan(world, microbe, plan - 1);
    if !try_advance(world, microbe, PATROL_STEP) {
        replan(world, microbe);
    }
}

/// Turns toward the nearest edible in range, or a random heading.
fn replan(world: &mut World, microbe: Entity) {
    let heading = match bearing_to_nearest_edible(world, microbe, EDIBLE_SENSE_RADIUS) {
        Some(bearing) => bearing,
        None => with_rng(world, |rng| rng.heading()),
    };
    face(world, microbe, heading);
    set_plan(world, microbe, PLAN_LENGTH);
}

fn set_plan(world: &mut World, microbe: Entity, plan: u32) {
    if let Some(mut state) = world.get_mut::<MicrobeState>(microbe) {
        state.movement_plan = plan;
    }
}

/// Tries small steps, turning a little after each blocked one.
fn bump_and_turn(world: &mut World, microbe: Entity) -> bool {
    for _ in 0..TRACKER_TURN_ATTEMPTS {
        if try_advance(world, microbe, TRACKER_STEP) {
            return true;
        }
        if let Some(mut heading) = world.get_mut::<Heading>(microbe) {
            heading.rotate(TRACKER_TURN_STEP);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::rng::SimRng;
    use crate::spatial::{live_entries, AvatarHandle, Roster};
    use crate::systems::lifecycle::spawn_entity;
    use crate::systems::spawning::{spawn_dirt, spawn_food};
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn setup_world() -> World {
        let mut world = World::new();
        world.insert_resource(Roster::default());
        world.insert_resource(AvatarHandle::default());
        world.insert_resource(SimConfig::default());
        world.insert_resource(SimRng::seeded(21));
        world
    }

    fn add_avatar(world: &mut World, pos: Position) -> Entity {
        let armament = Armament { spray_charges: 20, flame_charges: 5 };
        let avatar = world.spawn(AvatarBundle::new(pos, 0.0, 100, armament)).id();
        world.resource_mut::<AvatarHandle>().0 = Some(avatar);
        avatar
    }

    fn add_microbe(world: &mut World, kind: MicrobeKind, pos: Position) -> Entity {
        spawn_entity(world, MicrobeBundle::new(kind, pos))
    }

    fn pos(world: &World, e: Entity) -> Position {
        *world.get::<Position>(e).unwrap()
    }

    fn state(world: &World, e: Entity) -> MicrobeState {
        *world.get::<MicrobeState>(e).unwrap()
    }

    #[test]
    fn test_offspring_moves_toward_center() {
        assert_eq!(offspring_position(Position::new(10.0, 200.0)), Position::new(14.0, 196.0));
        assert_eq!(offspring_position(Position::new(128.0, 60.0)), Position::new(128.0, 64.0));
    }

    #[test]
    fn test_eating_then_dividing() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        let microbe = add_microbe(&mut world, MicrobeKind::Patroller, Position::new(100.0, 100.0));
        world.get_mut::<MicrobeState>(microbe).unwrap().food = 2;
        let food = spawn_food(&mut world, Position::new(102.0, 100.0));

        assert_eq!(metabolize(&mut world, microbe, MicrobeKind::Patroller, &mut round), Metabolism::Ate);
        assert_eq!(state(&world, microbe).food, 3);
        assert!(world.get::<Liveness>(food).is_some_and(|l| !l.is_alive()));

        assert_eq!(metabolize(&mut world, microbe, MicrobeKind::Patroller, &mut round), Metabolism::Divided);
        assert_eq!(state(&world, microbe).food, 0);
        let children: Vec<_> = live_entries(&world)
            .filter(|e| e.entity != microbe && e.kind == EntityKind::Microbe(MicrobeKind::Patroller))
            .collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].position, Position::new(104.0, 104.0));
    }

    #[test]
    fn test_patroller_heads_for_food() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        let microbe = add_microbe(&mut world, MicrobeKind::Patroller, Position::new(100.0, 100.0));
        spawn_food(&mut world, Position::new(100.0, 60.0));

        step(&mut world, microbe, MicrobeKind::Patroller, &mut round);
        assert_relative_eq!(world.get::<Heading>(microbe).unwrap().degrees(), 270.0, epsilon = 1e-3);
        assert_eq!(state(&world, microbe).movement_plan, PLAN_LENGTH);

        step(&mut world, microbe, MicrobeKind::Patroller, &mut round);
        assert_relative_eq!(pos(&world, microbe).y, 97.0, epsilon = 1e-3);
        assert_eq!(state(&world, microbe).movement_plan, PLAN_LENGTH - 1);
    }

    #[test]
    fn test_blocked_patroller_does_not_move() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        let microbe = add_microbe(&mut world, MicrobeKind::Patroller, Position::new(100.0, 100.0));
        world.get_mut::<MicrobeState>(microbe).unwrap().movement_plan = 5;
        world.get_mut::<Heading>(microbe).unwrap().set(0.0);
        spawn_dirt(&mut world, Position::new(103.0, 100.0));
        spawn_food(&mut world, Position::new(100.0, 60.0));

        step(&mut world, microbe, MicrobeKind::Patroller, &mut round);
        assert_eq!(pos(&world, microbe), Position::new(100.0, 100.0));
        assert_eq!(state(&world, microbe).movement_plan, PLAN_LENGTH);
        assert_relative_eq!(world.get::<Heading>(microbe).unwrap().degrees(), 270.0, epsilon = 1e-3);
    }

    #[rstest]
    #[case(0)]
    #[case(7)]
    #[case(19)]
    fn test_blocked_patroller_turns_to_food_for_any_seed(#[case] seed: u64) {
        let mut world = setup_world();
        world.insert_resource(SimRng::seeded(seed));
        let mut round = RoundContext::new(1);
        let microbe = add_microbe(&mut world, MicrobeKind::Patroller, Position::new(100.0, 100.0));
        world.get_mut::<MicrobeState>(microbe).unwrap().movement_plan = 5;
        world.get_mut::<Heading>(microbe).unwrap().set(0.0);
        spawn_dirt(&mut world, Position::new(103.0, 100.0));
        spawn_food(&mut world, Position::new(100.0, 60.0));

        step(&mut world, microbe, MicrobeKind::Patroller, &mut round);
        assert_relative_eq!(world.get::<Heading>(microbe).unwrap().degrees(), 270.0, epsilon = 1e-3);
    }

    #[test]
    fn test_hunter_out_of_range_patrols() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        add_avatar(&mut world, Position::new(100.0, 200.0));
        let hunter = add_microbe(&mut world, MicrobeKind::Hunter, Position::new(100.0, 100.0));
        spawn_food(&mut world, Position::new(100.0, 60.0));

        step(&mut world, hunter, MicrobeKind::Hunter, &mut round);
        assert_eq!(pos(&world, hunter), Position::new(100.0, 100.0));
        assert_relative_eq!(world.get::<Heading>(hunter).unwrap().degrees(), 270.0, epsilon = 1e-3);
        assert_eq!(state(&world, hunter).movement_plan, PLAN_LENGTH);
    }

    #[test]
    fn test_hunter_blocked_chase_falls_back_to_feeding() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        add_avatar(&mut world, Position::new(100.0, 150.0));
        let hunter = add_microbe(&mut world, MicrobeKind::Hunter, Position::new(100.0, 100.0));
        spawn_dirt(&mut world, Position::new(100.0, 104.0));
        let food = spawn_food(&mut world, Position::new(98.0, 100.0));

        step(&mut world, hunter, MicrobeKind::Hunter, &mut round);
        assert_eq!(pos(&world, hunter), Position::new(100.0, 100.0));
        assert_eq!(state(&world, hunter).food, 1);
        assert!(world.get::<Liveness>(food).is_some_and(|l| !l.is_alive()));
    }

    #[test]
    fn test_boxed_in_tracker_gives_up() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        add_avatar(&mut world, Position::new(200.0, 100.0));
        let tracker = add_microbe(&mut world, MicrobeKind::Tracker, Position::new(100.0, 100.0));
        // Every step of two lands within blocking range of this clod.
        spawn_dirt(&mut world, Position::new(100.0, 100.0));

        step(&mut world, tracker, MicrobeKind::Tracker, &mut round);
        assert_eq!(pos(&world, tracker), Position::new(100.0, 100.0));
        assert_relative_eq!(
            world.get::<Heading>(tracker).unwrap().degrees(),
            TRACKER_TURN_ATTEMPTS as f32 * TRACKER_TURN_STEP,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_hunter_chases_avatar_in_range() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        add_avatar(&mut world, Position::new(100.0, 150.0));
        let hunter = add_microbe(&mut world, MicrobeKind::Hunter, Position::new(100.0, 100.0));

        step(&mut world, hunter, MicrobeKind::Hunter, &mut round);
        assert_relative_eq!(pos(&world, hunter).y, 103.0, epsilon = 1e-3);
        assert_relative_eq!(world.get::<Heading>(hunter).unwrap().degrees(), 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_hunter_bites_instead_of_moving() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        let avatar = add_avatar(&mut world, Position::new(100.0, 105.0));
        let hunter = add_microbe(&mut world, MicrobeKind::Hunter, Position::new(100.0, 100.0));
        spawn_food(&mut world, Position::new(101.0, 100.0));

        step(&mut world, hunter, MicrobeKind::Hunter, &mut round);
        assert_eq!(pos(&world, hunter), Position::new(100.0, 100.0));
        assert_eq!(world.get::<Health>(avatar).unwrap().current, 98);
        assert_eq!(state(&world, hunter).food, 0);
    }

    #[test]
    fn test_tracker_slides_around_obstacle() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        add_avatar(&mut world, Position::new(200.0, 100.0));
        let tracker = add_microbe(&mut world, MicrobeKind::Tracker, Position::new(100.0, 100.0));
        spawn_dirt(&mut world, Position::new(105.5, 100.0));

        step(&mut world, tracker, MicrobeKind::Tracker, &mut round);
        let moved = pos(&world, tracker);
        assert_ne!(moved, Position::new(100.0, 100.0));
        assert_relative_eq!(moved.distance_to(&Position::new(100.0, 100.0)), TRACKER_STEP, epsilon = 1e-3);
        assert!(world.get::<Heading>(tracker).unwrap().degrees() > 0.0);
    }

    #[test]
    fn test_tracker_bite_scales_with_variant() {
        let mut world = setup_world();
        let mut round = RoundContext::new(1);
        let avatar = add_avatar(&mut world, Position::new(100.0, 100.0));
        let tracker = add_microbe(&mut world, MicrobeKind::Tracker, Position::new(104.0, 100.0));

        step(&mut world, tracker, MicrobeKind::Tracker, &mut round);
        assert_eq!(world.get::<Health>(avatar).unwrap().current, 96);
        assert_eq!(pos(&world, tracker), Position::new(104.0, 100.0));
    }
}
