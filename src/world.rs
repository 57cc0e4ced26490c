//! Snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of a round that a
//! renderer or HUD can consume without touching the ECS world.

use crate::components::*;
use crate::round::RoundContext;
use crate::spatial::{is_alive, AvatarHandle, Roster};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Avatar state as shown on the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvatarSnapshot {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub hp: i32,
    pub spray_charges: i32,
    pub flame_charges: i32,
    pub alive: bool,
}

/// One live non-avatar entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: u32,
    pub tag: String,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub depth: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
}

/// Complete round state at the end of a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub level: u32,
    pub lives: u32,
    pub score: i64,
    pub avatar: Option<AvatarSnapshot>,
    /// Live entities in stepping order.
    pub entities: Vec<EntitySnapshot>,
}

impl AvatarSnapshot {
    pub fn from_world(world: &World, avatar: Entity) -> Option<Self> {
        let pos = world.get::<Position>(avatar)?;
        let armament = world.get::<Armament>(avatar)?;
        Some(Self {
            x: pos.x,
            y: pos.y,
            heading: world.get::<Heading>(avatar).map_or(0.0, Heading::degrees),
            hp: world.get::<Health>(avatar).map_or(0, |h| h.current),
            spray_charges: armament.spray_charges,
            flame_charges: armament.flame_charges,
            alive: is_alive(world, avatar),
        })
    }
}

impl EntitySnapshot {
    pub fn from_world(world: &World, entity: Entity) -> Option<Self> {
        let kind = world.get::<EntityKind>(entity)?;
        let pos = world.get::<Position>(entity)?;
        Some(Self {
            id: entity.index(),
            tag: kind.tag().to_string(),
            x: pos.x,
            y: pos.y,
            heading: world.get::<Heading>(entity).map_or(0.0, Heading::degrees),
            depth: world.get::<RenderDepth>(entity).map_or(0, |d| d.0),
            hp: world.get::<Health>(entity).map(|h| h.current),
        })
    }

    pub fn kind(&self) -> Option<EntityKind> {
        EntityKind::from_tag(&self.tag)
    }
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &World, tick: u64, round: &RoundContext) -> Self {
        let avatar = world
            .get_resource::<AvatarHandle>()
            .and_then(|h| h.0)
            .and_then(|e| AvatarSnapshot::from_world(world, e));

        let entities = world
            .get_resource::<Roster>()
            .map(|roster| {
                roster
                    .0
                    .iter()
                    .filter(|&&e| is_alive(world, e))
                    .filter_map(|&e| EntitySnapshot::from_world(world, e))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            tick,
            level: round.level,
            lives: round.lives,
            score: round.score,
            avatar,
            entities,
        }
    }

    pub fn count_tag(&self, tag: &str) -> usize {
        self.entities.iter().filter(|e| e.tag == tag).count()
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
