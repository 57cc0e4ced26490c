//! Public API for the simulation.
//!
//! `SimWorld` is the round controller a host drives: it seeds an arena,
//! advances it one tick at a time and exposes read-only views of the
//! result. Hosts own the frame loop, input polling and rendering.
//!
//! ## Tick
//!
//! Each call to [`SimWorld::advance_one_tick`] rolls random pickups, applies
//! the pending command to the avatar, steps every roster entity that existed
//! at the start of the tick, then sweeps the dead. Entities spawned during
//! the tick are visible to queries at once but first act on the next tick.

use bevy_ecs::prelude::*;
use log::{info, trace, warn};

use crate::components::*;
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::profiler::{timed, Profiler, PHASE_AVATAR, PHASE_ENTITIES, PHASE_REAP, PHASE_SPAWN};
use crate::rng::SimRng;
use crate::round::{RoundContext, RoundStatus};
use crate::spatial::{is_alive, AvatarHandle, Roster};
use crate::systems::avatar::{self, Command};
use crate::systems::spawning::{self, SeedReport};
use crate::systems::{reap_dead_system, round_blocked, step_entity, SimTick};
use crate::world::{AvatarSnapshot, Snapshot};

/// The round controller.
pub struct SimWorld {
    world: World,
    reap_schedule: Schedule,
    round: RoundContext,
    pending: Option<Command>,
    profiler: Option<Profiler>,
}

impl SimWorld {
    /// Create a controller with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a controller with a custom configuration.
    pub fn with_config(config: SimConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(SimRng::from_seed_option(config.seed));
        world.insert_resource(config);
        world.insert_resource(Roster::default());
        world.insert_resource(AvatarHandle::default());
        world.insert_resource(SimTick(0));

        let mut reap_schedule = Schedule::default();
        reap_schedule.add_systems(reap_dead_system);

        Self {
            world,
            reap_schedule,
            round: RoundContext::default(),
            pending: None,
            profiler: cfg!(feature = "profile").then(Profiler::new),
        }
    }

    /// Tears down any previous round, places the avatar and seeds the
    /// arena for `level`. Score and lives carry over between rounds.
    pub fn init(&mut self, level: u32) -> SimResult<SeedReport> {
        self.init_bare(level)?;
        let config = self.config().clone();
        match spawning::seed_arena(&mut self.world, level, &config) {
            Ok(report) => Ok(report),
            Err(err) => {
                warn!("round setup for level {level} failed: {err}");
                self.teardown();
                Err(err)
            }
        }
    }

    /// Like [`init`](Self::init) but places only the avatar. Hosts and tests
    /// populate the arena through the `spawn_*` methods.
    pub fn init_bare(&mut self, level: u32) -> SimResult<()> {
        self.config().validate()?;
        self.teardown();
        self.round.level = level;
        let config = self.config().clone();
        let avatar = avatar::spawn_avatar(&mut self.world, &config);
        self.world.resource_mut::<AvatarHandle>().0 = Some(avatar);
        info!("round init: level {}, lives {}, score {}", level, self.round.lives, self.round.score);
        Ok(())
    }

    /// Despawns every entity and forgets the avatar.
    pub fn teardown(&mut self) {
        let mut doomed = std::mem::take(&mut self.world.resource_mut::<Roster>().0);
        doomed.extend(self.world.resource_mut::<AvatarHandle>().0.take());
        let count = doomed.len();
        for entity in doomed {
            self.world.despawn(entity);
        }
        self.world.resource_mut::<SimTick>().0 = 0;
        self.pending = None;
        if count > 0 {
            info!("round teardown: {count} entities removed");
        }
    }

    /// Input for the next tick. Consumed by that tick.
    pub fn set_input(&mut self, command: Option<Command>) {
        self.pending = command;
    }

    /// Runs one tick and reports how the round stands.
    pub fn advance_one_tick(&mut self) -> RoundStatus {
        let Some(player) = self.avatar_entity() else {
            warn!("tick requested without an avatar");
            return RoundStatus::AvatarDied;
        };
        if !is_alive(&self.world, player) {
            // The life was already taken on the tick it died.
            return RoundStatus::AvatarDied;
        }
        self.world.resource_mut::<SimTick>().increment();
        let level = self.round.level;

        let world = &mut self.world;
        let round = &mut self.round;
        let command = self.pending.take();
        let profiler = &mut self.profiler;
        // Entities appended this tick, pickups and shots included, wait for the next one.
        let count = world.resource::<Roster>().len();

        timed(profiler, PHASE_SPAWN, || spawning::spawn_pickups(world, level));
        timed(profiler, PHASE_AVATAR, || avatar::step(world, player, command));
        timed(profiler, PHASE_ENTITIES, || {
            for index in 0..count {
                let Some(entity) = world.resource::<Roster>().get(index) else {
                    break;
                };
                step_entity(world, entity, round);
            }
        });
        let reap_schedule = &mut self.reap_schedule;
        timed(profiler, PHASE_REAP, || reap_schedule.run(world));
        if let Some(p) = profiler.as_mut() {
            p.tick();
        }

        let tick = self.current_tick();
        trace!(
            "tick {}: {} entities, score {}",
            tick,
            self.entity_count(),
            self.round.score
        );

        if !is_alive(&self.world, player) {
            self.round.lose_life();
            info!("avatar died on tick {tick}, {} lives left", self.round.lives);
            return RoundStatus::AvatarDied;
        }
        if !round_blocked(&self.world) {
            info!("level {} cleared on tick {tick}, score {}", self.round.level, self.round.score);
            return RoundStatus::RoundWon;
        }
        RoundStatus::Continue
    }

    // ===== Read accessors =====

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_world(&self.world, self.current_tick(), &self.round)
    }

    pub fn snapshot_json(&self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    pub fn avatar_state(&self) -> Option<AvatarSnapshot> {
        AvatarSnapshot::from_world(&self.world, self.avatar_entity()?)
    }

    pub fn avatar_entity(&self) -> Option<Entity> {
        self.world.get_resource::<AvatarHandle>().and_then(|h| h.0)
    }

    pub fn round(&self) -> &RoundContext {
        &self.round
    }

    pub fn score(&self) -> i64 {
        self.round.score
    }

    pub fn level(&self) -> u32 {
        self.round.level
    }

    pub fn lives(&self) -> u32 {
        self.round.lives
    }

    pub fn current_tick(&self) -> u64 {
        self.world.get_resource::<SimTick>().map_or(0, |t| t.0)
    }

    /// Non-avatar entities currently in the roster, dead or alive.
    pub fn entity_count(&self) -> usize {
        self.world.get_resource::<Roster>().map_or(0, Roster::len)
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    // ===== Profiling =====

    pub fn enable_profiling(&mut self) {
        self.profiler.get_or_insert_with(Profiler::new);
    }

    pub fn profiler(&self) -> Option<&Profiler> {
        self.profiler.as_ref()
    }

    // ===== Direct placement =====

    pub fn spawn_microbe(&mut self, kind: MicrobeKind, x: f32, y: f32) -> Entity {
        spawning::spawn_microbe(&mut self.world, kind, Position::new(x, y))
    }

    pub fn spawn_food(&mut self, x: f32, y: f32) -> Entity {
        spawning::spawn_food(&mut self.world, Position::new(x, y))
    }

    pub fn spawn_dirt(&mut self, x: f32, y: f32) -> Entity {
        spawning::spawn_dirt(&mut self.world, Position::new(x, y))
    }

    pub fn spawn_pit(&mut self, x: f32, y: f32, counts: [u32; 3]) -> Entity {
        spawning::spawn_pit(&mut self.world, Position::new(x, y), counts)
    }

    pub fn spawn_pickup(&mut self, kind: PickupKind, x: f32, y: f32, lifetime: i32) -> Entity {
        spawning::spawn_pickup(&mut self.world, kind, Position::new(x, y), lifetime)
    }

    pub fn spawn_projectile(&mut self, kind: ProjectileKind, x: f32, y: f32, heading: f32) -> Entity {
        spawning::spawn_projectile(&mut self.world, kind, Position::new(x, y), heading)
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
