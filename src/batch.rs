//! Headless batch play for balancing and benchmarking.
//!
//! Each round runs on its own controller with its own seed. With the
//! `parallel` feature the rounds are spread across rayon's thread pool;
//! each round still steps single-threaded.

use serde::{Deserialize, Serialize};

use crate::api::SimWorld;
use crate::components::EntityKind;
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::round::RoundStatus;
use crate::spatial::{live_entries, position_of};
use crate::systems::avatar::Command;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One round to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSpec {
    pub seed: u64,
    pub level: u32,
    pub max_ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Won,
    AvatarDied,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub spec: RoundSpec,
    pub outcome: RoundOutcome,
    pub ticks: u64,
    pub score: i64,
    pub microbes_left: usize,
}

/// Scripted stand-in for a player.
///
/// Flames anything that gets close, otherwise sweeps around the rim firing
/// spray toward the center.
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Microbes within this distance trigger a flame burst.
    pub flame_trigger: f32,
    /// Fire spray every this many ticks.
    pub spray_interval: u64,
    /// Ticks spent sweeping in one direction before reversing.
    pub sweep_length: u64,
    tick: u64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            flame_trigger: 24.0,
            spray_interval: 3,
            sweep_length: 36,
            tick: 0,
        }
    }
}

impl Autopilot {
    pub fn decide(&mut self, sim: &SimWorld) -> Option<Command> {
        self.tick += 1;
        let avatar = sim.avatar_state()?;
        if !avatar.alive {
            return None;
        }

        if avatar.flame_charges > 0 && self.nearest_microbe(sim).is_some_and(|d| d <= self.flame_trigger) {
            return Some(Command::FireFlame);
        }
        if avatar.spray_charges > 0 && self.tick % self.spray_interval.max(1) == 0 {
            return Some(Command::FireSpray);
        }
        // Leave some ticks idle so the spray can recharge.
        if self.tick % 2 == 0 {
            return None;
        }
        let leg = (self.tick / self.sweep_length.max(1)) % 2;
        Some(if leg == 0 { Command::RotateLeft } else { Command::RotateRight })
    }

    fn nearest_microbe(&self, sim: &SimWorld) -> Option<f32> {
        let world = sim.world();
        let origin = position_of(world, sim.avatar_entity()?)?;
        live_entries(world)
            .filter(|e| e.kind.is_microbe())
            .map(|e| e.position.distance_to(&origin))
            .min_by(f32::total_cmp)
    }
}

/// Plays one round to completion or until its tick limit.
pub fn run_round(spec: RoundSpec, config: &SimConfig) -> SimResult<RoundReport> {
    let mut sim = SimWorld::with_config(SimConfig {
        seed: Some(spec.seed),
        ..config.clone()
    });
    sim.init(spec.level)?;

    let mut pilot = Autopilot::default();
    let mut outcome = RoundOutcome::TimedOut;
    let mut ticks = 0;
    while ticks < spec.max_ticks {
        sim.set_input(pilot.decide(&sim));
        ticks += 1;
        match sim.advance_one_tick() {
            RoundStatus::Continue => {}
            RoundStatus::AvatarDied => {
                outcome = RoundOutcome::AvatarDied;
                break;
            }
            RoundStatus::RoundWon => {
                outcome = RoundOutcome::Won;
                break;
            }
        }
    }

    let microbes_left = live_entries(sim.world())
        .filter(|e| matches!(e.kind, EntityKind::Microbe(_)))
        .count();
    Ok(RoundReport {
        spec,
        outcome,
        ticks,
        score: sim.score(),
        microbes_left,
    })
}

/// Plays every round independently; results keep the input order.
pub fn run_rounds(specs: &[RoundSpec], config: &SimConfig) -> Vec<SimResult<RoundReport>> {
    #[cfg(feature = "parallel")]
    {
        specs.par_iter().map(|&spec| run_round(spec, config)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        specs.iter().map(|&spec| run_round(spec, config)).collect()
    }
}
