//! Round configuration.
//!
//! Everything that shapes a round's difficulty lives here so hosts can tune
//! a run from JSON without recompiling. Fields missing from the JSON fall
//! back to [`SimConfig::default`].

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::geometry::ARENA_RADIUS;

/// Tunables for seeding, spawning and round completion.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed RNG seed; `None` draws one from entropy.
    pub seed: Option<u64>,

    // ----- placement -----
    /// Maximum distance from center for seeded entities.
    pub placement_radius: f32,
    /// Pits are placed no closer to center than this.
    pub pit_min_radius: f32,
    /// Placement tries per seeded item before giving up.
    pub max_placement_attempts: u32,

    // ----- seeding counts -----
    pub food_per_level: u32,
    pub max_food: u32,
    pub dirt_base: u32,
    pub dirt_per_level: u32,
    pub min_dirt: u32,

    // ----- avatar -----
    pub avatar_max_hp: i32,
    pub spray_cap: i32,
    pub starting_flame_charges: i32,

    // ----- pits -----
    /// Latent microbes per pit: patrollers, hunters, trackers.
    pub pit_contents: [u32; 3],
    /// A pit emits with probability 1 in this many per tick.
    pub pit_emit_odds: u32,

    // ----- per-tick pickups -----
    /// Disable to keep a round free of random pickups.
    pub random_pickups: bool,
    pub pickup_lifetime_base: i32,
    pub pickup_lifetime_per_level: i32,
    pub min_pickup_lifetime: i32,
    pub pickup_odds_base: u32,
    pub fungus_odds_base: u32,
    pub odds_per_level: u32,
    pub max_spawn_odds: u32,

    /// When set, living microbes also keep the round from completing.
    pub microbes_block_completion: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            placement_radius: 120.0,
            pit_min_radius: 64.0,
            max_placement_attempts: 10_000,
            food_per_level: 5,
            max_food: 25,
            dirt_base: 180,
            dirt_per_level: 20,
            min_dirt: 20,
            avatar_max_hp: 100,
            spray_cap: 20,
            starting_flame_charges: 5,
            pit_contents: [5, 3, 2],
            pit_emit_odds: 50,
            random_pickups: true,
            pickup_lifetime_base: 300,
            pickup_lifetime_per_level: 10,
            min_pickup_lifetime: 50,
            pickup_odds_base: 250,
            fungus_odds_base: 200,
            odds_per_level: 10,
            max_spawn_odds: 510,
            microbes_block_completion: false,
        }
    }
}

impl SimConfig {
    /// A default configuration with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parses a (possibly partial) JSON configuration and validates it.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects values that cannot produce a playable arena.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.placement_radius > 0.0 && self.placement_radius < ARENA_RADIUS) {
            return Err(SimError::InvalidConfig(format!(
                "placement_radius must be in (0, {ARENA_RADIUS}), got {}",
                self.placement_radius
            )));
        }
        if self.pit_min_radius < 0.0 || self.pit_min_radius >= self.placement_radius {
            return Err(SimError::InvalidConfig(format!(
                "pit_min_radius must be in [0, placement_radius), got {}",
                self.pit_min_radius
            )));
        }
        if self.max_placement_attempts == 0 {
            return Err(SimError::InvalidConfig(
                "max_placement_attempts must be positive".into(),
            ));
        }
        if self.avatar_max_hp <= 0 {
            return Err(SimError::InvalidConfig(
                "avatar_max_hp must be positive".into(),
            ));
        }
        if self.pit_emit_odds == 0 || self.pickup_odds_base == 0 || self.fungus_odds_base == 0 {
            return Err(SimError::InvalidConfig("spawn odds must be positive".into()));
        }
        Ok(())
    }

    pub fn food_count(&self, level: u32) -> usize {
        (self.food_per_level.saturating_mul(level)).min(self.max_food) as usize
    }

    pub fn dirt_count(&self, level: u32) -> usize {
        self.dirt_base
            .saturating_sub(self.dirt_per_level.saturating_mul(level))
            .max(self.min_dirt) as usize
    }

    /// Upper bound of the random pickup lifetime roll; may be negative.
    pub fn pickup_lifetime_ceiling(&self, level: u32) -> i32 {
        let level = i32::try_from(level).unwrap_or(i32::MAX);
        self.pickup_lifetime_base
            .saturating_sub(self.pickup_lifetime_per_level.saturating_mul(level))
    }

    /// Pickups grow rarer as the level rises, up to a cap.
    pub fn pickup_odds(&self, level: u32) -> u32 {
        self.scaled_odds(self.pickup_odds_base, level)
    }

    pub fn fungus_odds(&self, level: u32) -> u32 {
        self.scaled_odds(self.fungus_odds_base, level)
    }

    fn scaled_odds(&self, base: u32, level: u32) -> u32 {
        base.saturating_add(self.odds_per_level.saturating_mul(level))
            .min(self.max_spawn_odds)
    }
}
