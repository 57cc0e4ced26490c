//! ECS Components for the petri dish simulation.
//!
//! Components are pure data containers attached to entities.
//! Per-kind behavior lives in `systems`; the closed set of entity kinds and
//! their capabilities is [`EntityKind`].

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::wrap_degrees;

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in arena coordinates (`0..256` on both axes).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Facing in degrees, always kept in `[0, 360)`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Heading(f32);

impl Heading {
    pub fn new(degrees: f32) -> Self {
        Self(wrap_degrees(degrees))
    }

    pub fn degrees(&self) -> f32 {
        self.0
    }

    pub fn set(&mut self, degrees: f32) {
        self.0 = wrap_degrees(degrees);
    }

    pub fn rotate(&mut self, delta: f32) {
        self.set(self.0 + delta);
    }
}

/// Draw layer for renderers. Lower values draw on top.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderDepth(pub u8);

// ============================================================================
// LIFECYCLE COMPONENTS
// ============================================================================

/// Whether an entity may still act and be interacted with.
///
/// Cleared exactly once; the entity is swept at the end of the tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liveness {
    alive: bool,
}

impl Liveness {
    pub fn alive() -> Self {
        Self { alive: true }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Clears the flag. Returns `false` if it was already cleared.
    pub fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::alive()
    }
}

/// Hit points, optionally clamped to a cap when healed.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub cap: Option<i32>,
}

impl Health {
    pub fn new(hp: i32) -> Self {
        Self { current: hp, cap: None }
    }

    pub fn capped(hp: i32, cap: i32) -> Self {
        Self {
            current: hp.min(cap),
            cap: Some(cap),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Subtracts `amount`. Returns `true` only on the hit that empties it.
    pub fn damage(&mut self, amount: i32) -> bool {
        let was_alive = self.is_alive();
        self.current = (self.current - amount).max(0);
        was_alive && !self.is_alive()
    }

    pub fn heal(&mut self, amount: i32) {
        let healed = self.current.saturating_add(amount);
        self.current = match self.cap {
            Some(cap) => healed.min(cap),
            None => healed,
        };
    }
}

// ============================================================================
// ENTITY KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MicrobeKind {
    /// Wanders toward food.
    Patroller,
    /// Chases the avatar when close, otherwise wanders.
    Hunter,
    /// Tracks the avatar from anywhere in the arena.
    Tracker,
}

impl MicrobeKind {
    /// Order matches [`LatentMicrobes`] slots.
    pub const ALL: [MicrobeKind; 3] = [Self::Patroller, Self::Hunter, Self::Tracker];

    pub fn max_hp(self) -> i32 {
        match self {
            Self::Patroller => 4,
            Self::Hunter => 10,
            Self::Tracker => 5,
        }
    }

    /// Damage dealt to the avatar on contact.
    pub fn contact_damage(self) -> i32 {
        match self {
            Self::Patroller => 1,
            Self::Hunter => 2,
            Self::Tracker => 4,
        }
    }

    pub fn slot(self) -> usize {
        match self {
            Self::Patroller => 0,
            Self::Hunter => 1,
            Self::Tracker => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    RestoreHealth,
    FlameCharges,
    ExtraLife,
    /// Harmful pickup: damages the avatar and costs score.
    Fungus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Spray,
    Flame,
}

impl ProjectileKind {
    pub fn travel_budget(self) -> i32 {
        match self {
            Self::Spray => 120,
            Self::Flame => 40,
        }
    }

    pub fn damage(self) -> i32 {
        match self {
            Self::Spray => 2,
            Self::Flame => 5,
        }
    }
}

/// Closed set of entity kinds with their capability table.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Avatar,
    Microbe(MicrobeKind),
    Pit,
    Food,
    Dirt,
    Pickup(PickupKind),
    Projectile(ProjectileKind),
}

impl EntityKind {
    /// Obstacles refuse movement into their blocking radius.
    pub fn blocks_movement(self) -> bool {
        matches!(self, Self::Dirt)
    }

    pub fn is_edible(self) -> bool {
        matches!(self, Self::Food)
    }

    /// Can be hit by projectiles.
    pub fn is_damageable(self) -> bool {
        self.is_microbe() || self.blocks_movement() || self.is_goodie()
    }

    /// Collectible by the avatar, harmful or not.
    pub fn is_goodie(self) -> bool {
        matches!(self, Self::Pickup(_))
    }

    pub fn is_microbe(self) -> bool {
        matches!(self, Self::Microbe(_))
    }

    pub fn depth(self) -> RenderDepth {
        match self {
            Self::Avatar | Self::Microbe(_) => RenderDepth(0),
            _ => RenderDepth(1),
        }
    }

    /// Stable text tag used in snapshots.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Microbe(MicrobeKind::Patroller) => "patroller",
            Self::Microbe(MicrobeKind::Hunter) => "hunter",
            Self::Microbe(MicrobeKind::Tracker) => "tracker",
            Self::Pit => "pit",
            Self::Food => "food",
            Self::Dirt => "dirt",
            Self::Pickup(PickupKind::RestoreHealth) => "restore_health",
            Self::Pickup(PickupKind::FlameCharges) => "flame_charges",
            Self::Pickup(PickupKind::ExtraLife) => "extra_life",
            Self::Pickup(PickupKind::Fungus) => "fungus",
            Self::Projectile(ProjectileKind::Spray) => "spray",
            Self::Projectile(ProjectileKind::Flame) => "flame",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub const ALL: [EntityKind; 13] = [
        Self::Avatar,
        Self::Microbe(MicrobeKind::Patroller),
        Self::Microbe(MicrobeKind::Hunter),
        Self::Microbe(MicrobeKind::Tracker),
        Self::Pit,
        Self::Food,
        Self::Dirt,
        Self::Pickup(PickupKind::RestoreHealth),
        Self::Pickup(PickupKind::FlameCharges),
        Self::Pickup(PickupKind::ExtraLife),
        Self::Pickup(PickupKind::Fungus),
        Self::Projectile(ProjectileKind::Spray),
        Self::Projectile(ProjectileKind::Flame),
    ];
}

// ============================================================================
// PER-KIND STATE
// ============================================================================

/// Avatar weapon stock.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armament {
    pub spray_charges: i32,
    pub flame_charges: i32,
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrobeState {
    /// Edibles eaten since the last division.
    pub food: u32,
    /// Steps left before the current heading is reconsidered.
    pub movement_plan: u32,
}

/// Microbes a pit has yet to emit, indexed by [`MicrobeKind::slot`].
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatentMicrobes {
    pub counts: [u32; 3],
}

impl LatentMicrobes {
    pub fn new(counts: [u32; 3]) -> Self {
        Self { counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    pub fn remaining(&self, kind: MicrobeKind) -> u32 {
        self.counts[kind.slot()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Removes one microbe of `kind`. Returns `false` if none were left.
    pub fn take(&mut self, kind: MicrobeKind) -> bool {
        let slot = &mut self.counts[kind.slot()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}

/// Ticks a pickup remains collectible.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifetime(pub i32);

/// Distance a projectile may still travel.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelBudget(pub i32);

// ============================================================================
// BUNDLES
// ============================================================================

/// Components every entity carries.
#[derive(Bundle)]
pub struct EntityBundle {
    pub kind: EntityKind,
    pub position: Position,
    pub heading: Heading,
    pub depth: RenderDepth,
    pub liveness: Liveness,
}

impl EntityBundle {
    pub fn new(kind: EntityKind, position: Position, heading: f32) -> Self {
        Self {
            kind,
            position,
            heading: Heading::new(heading),
            depth: kind.depth(),
            liveness: Liveness::alive(),
        }
    }
}

#[derive(Bundle)]
pub struct AvatarBundle {
    pub base: EntityBundle,
    pub health: Health,
    pub armament: Armament,
}

impl AvatarBundle {
    pub fn new(position: Position, heading: f32, max_hp: i32, armament: Armament) -> Self {
        Self {
            base: EntityBundle::new(EntityKind::Avatar, position, heading),
            health: Health::capped(max_hp, max_hp),
            armament,
        }
    }
}

#[derive(Bundle)]
pub struct MicrobeBundle {
    pub base: EntityBundle,
    pub health: Health,
    pub state: MicrobeState,
}

impl MicrobeBundle {
    /// Fresh microbes face 90° with an empty stomach and no plan.
    pub fn new(kind: MicrobeKind, position: Position) -> Self {
        Self {
            base: EntityBundle::new(EntityKind::Microbe(kind), position, 90.0),
            health: Health::new(kind.max_hp()),
            state: MicrobeState::default(),
        }
    }
}

#[derive(Bundle)]
pub struct PitBundle {
    pub base: EntityBundle,
    pub latent: LatentMicrobes,
}

impl PitBundle {
    pub fn new(position: Position, counts: [u32; 3]) -> Self {
        Self {
            base: EntityBundle::new(EntityKind::Pit, position, 0.0),
            latent: LatentMicrobes::new(counts),
        }
    }
}

#[derive(Bundle)]
pub struct PickupBundle {
    pub base: EntityBundle,
    pub lifetime: Lifetime,
}

impl PickupBundle {
    pub fn new(kind: PickupKind, position: Position, lifetime: i32) -> Self {
        Self {
            base: EntityBundle::new(EntityKind::Pickup(kind), position, 0.0),
            lifetime: Lifetime(lifetime),
        }
    }
}

#[derive(Bundle)]
pub struct ProjectileBundle {
    pub base: EntityBundle,
    pub budget: TravelBudget,
}

impl ProjectileBundle {
    pub fn new(kind: ProjectileKind, position: Position, heading: f32) -> Self {
        Self {
            base: EntityBundle::new(EntityKind::Projectile(kind), position, heading),
            budget: TravelBudget(kind.travel_budget()),
        }
    }
}
