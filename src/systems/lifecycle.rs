//! Spawning into the roster, death, the end-of-tick sweep and the round
//! completion check.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::*;
use crate::config::SimConfig;
use crate::spatial::{is_alive, kind_of, Roster};

/// Global simulation tick counter.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Spawns a non-avatar entity and appends it to the roster.
///
/// The new entity is visible to queries at once but is only stepped from
/// the next tick on.
pub fn spawn_entity<B: Bundle>(world: &mut World, bundle: B) -> Entity {
    let entity = world.spawn(bundle).id();
    world.get_resource_or_insert_with(Roster::default).0.push(entity);
    entity
}

/// Clears the liveness flag. Returns `true` only for the call that killed it.
pub fn kill(world: &mut World, entity: Entity) -> bool {
    let killed = world
        .get_mut::<Liveness>(entity)
        .is_some_and(|mut liveness| liveness.kill());
    if killed {
        if let Some(kind) = kind_of(world, entity) {
            debug!("{} {:?} died", kind.tag(), entity);
        }
    }
    killed
}

/// Despawns entities whose liveness is cleared and drops them from the roster.
pub fn reap_dead_system(mut commands: Commands, mut roster: ResMut<Roster>, query: Query<&Liveness>) {
    roster.0.retain(|&entity| match query.get(entity) {
        Ok(liveness) if liveness.is_alive() => true,
        Ok(_) => {
            commands.entity(entity).despawn();
            false
        }
        Err(_) => false,
    });
}

/// Whether this entity keeps the round from being won.
pub fn prevents_round_completion(world: &World, entity: Entity) -> bool {
    if !is_alive(world, entity) {
        return false;
    }
    match kind_of(world, entity) {
        Some(EntityKind::Pit) => world
            .get::<LatentMicrobes>(entity)
            .is_some_and(|latent| !latent.is_empty()),
        Some(EntityKind::Microbe(_)) => world
            .get_resource::<SimConfig>()
            .is_some_and(|config| config.microbes_block_completion),
        _ => false,
    }
}

/// True while any roster entity still prevents completion.
pub fn round_blocked(world: &World) -> bool {
    world
        .get_resource::<Roster>()
        .is_some_and(|roster| roster.0.iter().any(|&e| prevents_round_completion(world, e)))
}
