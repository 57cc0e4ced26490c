//! Avatar control: orbiting the rim and firing.

use bevy_ecs::prelude::*;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::config::SimConfig;
use crate::geometry::{orbit_on_rim, position_in_direction, ARENA_RADIUS, SPRITE_WIDTH};
use crate::spatial::is_alive;
use crate::systems::lifecycle::kill;
use crate::systems::spawning::spawn_projectile;

/// Degrees the avatar moves around the rim per turn command.
pub const TURN_STEP: f32 = 5.0;
/// Number of flame projectiles in one radial burst.
pub const FLAME_BURST: usize = 16;

/// One tick of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    RotateLeft,
    RotateRight,
    FireSpray,
    FireFlame,
    Quit,
}

/// Where a fresh avatar stands: on the rim, left of center, facing in.
pub fn starting_position() -> Position {
    Position::new(128.0 - ARENA_RADIUS, 128.0)
}

pub fn spawn_avatar(world: &mut World, config: &SimConfig) -> Entity {
    let armament = Armament {
        spray_charges: config.spray_cap,
        flame_charges: config.starting_flame_charges,
    };
    world
        .spawn(AvatarBundle::new(starting_position(), 0.0, config.avatar_max_hp, armament))
        .id()
}

/// Applies one tick of input. With no input the spray regenerates.
pub fn step(world: &mut World, avatar: Entity, command: Option<Command>) {
    if !is_alive(world, avatar) {
        return;
    }
    match command {
        None => regenerate_spray(world, avatar),
        Some(Command::RotateLeft) => rotate(world, avatar, TURN_STEP),
        Some(Command::RotateRight) => rotate(world, avatar, -TURN_STEP),
        Some(Command::FireSpray) => fire_spray(world, avatar),
        Some(Command::FireFlame) => fire_flame(world, avatar),
        Some(Command::Quit) => {
            debug!("avatar quit");
            kill(world, avatar);
        }
    }
}

fn regenerate_spray(world: &mut World, avatar: Entity) {
    let cap = world
        .get_resource::<SimConfig>()
        .map_or(SimConfig::default().spray_cap, |c| c.spray_cap);
    if let Some(mut armament) = world.get_mut::<Armament>(avatar) {
        if armament.spray_charges < cap {
            armament.spray_charges += 1;
        }
    }
}

/// Orbits around the center, turning with the motion so the avatar keeps
/// facing the same way relative to the center.
fn rotate(world: &mut World, avatar: Entity, delta: f32) {
    if let Some(mut pos) = world.get_mut::<Position>(avatar) {
        *pos = orbit_on_rim(*pos, delta);
    }
    if let Some(mut heading) = world.get_mut::<Heading>(avatar) {
        heading.rotate(delta);
    }
}

/// Spends one charge of the given kind if any is left.
fn spend(world: &mut World, avatar: Entity, kind: ProjectileKind) -> bool {
    let Some(mut armament) = world.get_mut::<Armament>(avatar) else {
        return false;
    };
    let charges = match kind {
        ProjectileKind::Spray => &mut armament.spray_charges,
        ProjectileKind::Flame => &mut armament.flame_charges,
    };
    if *charges <= 0 {
        return false;
    }
    *charges -= 1;
    true
}

fn muzzle(world: &World, avatar: Entity) -> Option<(Position, f32)> {
    let pos = *world.get::<Position>(avatar)?;
    let heading = world.get::<Heading>(avatar)?.degrees();
    Some((pos, heading))
}

fn fire_spray(world: &mut World, avatar: Entity) {
    let Some((pos, heading)) = muzzle(world, avatar) else {
        return;
    };
    if spend(world, avatar, ProjectileKind::Spray) {
        let origin = position_in_direction(pos, heading, SPRITE_WIDTH);
        spawn_projectile(world, ProjectileKind::Spray, origin, heading);
    }
}

fn fire_flame(world: &mut World, avatar: Entity) {
    let Some((pos, _)) = muzzle(world, avatar) else {
        return;
    };
    if !spend(world, avatar, ProjectileKind::Flame) {
        return;
    }
    let spacing = 360.0 / FLAME_BURST as f32;
    for i in 0..FLAME_BURST {
        let heading = i as f32 * spacing;
        let origin = position_in_direction(pos, heading, SPRITE_WIDTH);
        spawn_projectile(world, ProjectileKind::Flame, origin, heading);
    }
    debug!("flame burst, {} projectiles", FLAME_BURST);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{distance_from_center, ARENA_CENTER};
    use crate::spatial::{live_entries, Roster};
    use approx::assert_relative_eq;

    fn setup() -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(Roster::default());
        let config = SimConfig::default();
        let avatar = spawn_avatar(&mut world, &config);
        world.insert_resource(config);
        (world, avatar)
    }

    fn armament(world: &World, avatar: Entity) -> Armament {
        *world.get::<Armament>(avatar).unwrap()
    }

    #[test]
    fn test_starts_on_rim_facing_center() {
        let (world, avatar) = setup();
        let pos = *world.get::<Position>(avatar).unwrap();
        assert_eq!(pos, Position::new(0.0, 128.0));
        assert_relative_eq!(distance_from_center(pos), ARENA_RADIUS);
        assert_eq!(world.get::<Heading>(avatar).unwrap().degrees(), 0.0);
        assert_eq!(armament(&world, avatar), Armament { spray_charges: 20, flame_charges: 5 });
    }

    #[test]
    fn test_rotation_stays_on_rim_and_faces_center() {
        let (mut world, avatar) = setup();
        for _ in 0..7 {
            step(&mut world, avatar, Some(Command::RotateLeft));
        }
        let pos = *world.get::<Position>(avatar).unwrap();
        assert_relative_eq!(distance_from_center(pos), ARENA_RADIUS, epsilon = 1e-3);

        let heading = world.get::<Heading>(avatar).unwrap().degrees();
        assert_relative_eq!(heading, 35.0, epsilon = 1e-3);
        let ahead = position_in_direction(pos, heading, ARENA_RADIUS);
        assert_relative_eq!(ahead.x, ARENA_CENTER.x, epsilon = 1e-2);
        assert_relative_eq!(ahead.y, ARENA_CENTER.y, epsilon = 1e-2);

        step(&mut world, avatar, Some(Command::RotateRight));
        assert_relative_eq!(world.get::<Heading>(avatar).unwrap().degrees(), 30.0, epsilon = 1e-3);
    }

    #[test]
    fn test_spray_spends_and_regenerates() {
        let (mut world, avatar) = setup();
        step(&mut world, avatar, Some(Command::FireSpray));
        assert_eq!(armament(&world, avatar).spray_charges, 19);

        let shots: Vec<_> = live_entries(&world).collect();
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].kind, EntityKind::Projectile(ProjectileKind::Spray));
        assert_relative_eq!(shots[0].position.x, SPRITE_WIDTH, epsilon = 1e-4);

        step(&mut world, avatar, None);
        assert_eq!(armament(&world, avatar).spray_charges, 20);
        step(&mut world, avatar, None);
        assert_eq!(armament(&world, avatar).spray_charges, 20);
    }

    #[test]
    fn test_empty_spray_fires_nothing() {
        let (mut world, avatar) = setup();
        world.get_mut::<Armament>(avatar).unwrap().spray_charges = 0;
        step(&mut world, avatar, Some(Command::FireSpray));
        assert_eq!(live_entries(&world).count(), 0);
        assert_eq!(armament(&world, avatar).spray_charges, 0);
    }

    #[test]
    fn test_flame_burst_is_radial() {
        let (mut world, avatar) = setup();
        step(&mut world, avatar, Some(Command::FireFlame));
        assert_eq!(armament(&world, avatar).flame_charges, 4);

        let flames: Vec<_> = live_entries(&world).collect();
        assert_eq!(flames.len(), FLAME_BURST);
        for (i, flame) in flames.iter().enumerate() {
            let heading = world.get::<Heading>(flame.entity).unwrap().degrees();
            assert_relative_eq!(heading, i as f32 * 22.5, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_quit_kills_avatar() {
        let (mut world, avatar) = setup();
        step(&mut world, avatar, Some(Command::Quit));
        assert!(!is_alive(&world, avatar));
    }
}
