//! Pits release their latent microbes one at a time, then collapse.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::*;
use crate::config::SimConfig;
use crate::rng::with_rng;
use crate::spatial::position_of;
use crate::systems::lifecycle::kill;
use crate::systems::spawning::spawn_microbe;

pub fn step(world: &mut World, pit: Entity) {
    let Some(latent) = world.get::<LatentMicrobes>(pit).copied() else {
        return;
    };
    let odds = world
        .get_resource::<SimConfig>()
        .map_or(SimConfig::default().pit_emit_odds, |c| c.pit_emit_odds);

    if !latent.is_empty() {
        let emitted = with_rng(world, |rng| {
            if !rng.one_in(odds) {
                return None;
            }
            // Redraw until a variant with remaining stock comes up.
            loop {
                let kind = MicrobeKind::ALL[rng.rand_int(0, 2) as usize];
                if latent.remaining(kind) > 0 {
                    return Some(kind);
                }
            }
        });
        if let Some(kind) = emitted {
            emit(world, pit, kind);
        }
    }

    let exhausted = world.get::<LatentMicrobes>(pit).map_or(true, LatentMicrobes::is_empty);
    if exhausted {
        debug!("pit {:?} exhausted", pit);
        kill(world, pit);
    }
}

fn emit(world: &mut World, pit: Entity, kind: MicrobeKind) {
    let taken = world
        .get_mut::<LatentMicrobes>(pit)
        .is_some_and(|mut latent| latent.take(kind));
    if !taken {
        return;
    }
    if let Some(pos) = position_of(world, pit) {
        spawn_microbe(world, kind, pos);
        debug!("pit {:?} emitted {:?}", pit, kind);
    }
}
