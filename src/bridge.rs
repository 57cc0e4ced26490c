//! Flat-buffer bridge for renderers.
//!
//! Converts a [`Snapshot`] into one contiguous `Vec<f32>` so a host written
//! in another language can draw a frame without parsing JSON.
//!
//! # Buffer Layout (Version 1.0)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ HEADER (HEADER_SIZE elements)                                   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ [0]  entity_count   - live non-avatar entities (as f32)         │
//! │ [1]  tick                                                       │
//! │ [2]  score                                                      │
//! │ [3]  lives                                                      │
//! │ [4]  level                                                      │
//! │ [5]  avatar_alive   - 1.0 alive, 0.0 dead or absent             │
//! │ [6]  avatar_x                                                   │
//! │ [7]  avatar_y                                                   │
//! │ [8]  avatar_heading - degrees                                   │
//! │ [9]  avatar_hp                                                  │
//! │ [10] spray_charges                                              │
//! │ [11] flame_charges                                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ ENTITY DATA (entity_count × ENTITY_STRIDE elements)             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ For entity i (offset = HEADER_SIZE + i * ENTITY_STRIDE):        │
//! │   [+0] id       - stable entity index                           │
//! │   [+1] kind     - see KIND_* constants                          │
//! │   [+2] x                                                        │
//! │   [+3] y                                                        │
//! │   [+4] heading  - degrees                                       │
//! │   [+5] depth    - draw layer, lower on top                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities appear in stepping order. The same snapshot always produces the
//! same buffer.

use crate::components::{EntityKind, MicrobeKind, PickupKind, ProjectileKind};
use crate::world::Snapshot;

// ============================================================================
// CONSTANTS - STABLE LAYOUT
// ============================================================================

pub const HEADER_SIZE: usize = 12;
pub const ENTITY_STRIDE: usize = 6;

pub const HEADER_ENTITY_COUNT: usize = 0;
pub const HEADER_TICK: usize = 1;
pub const HEADER_SCORE: usize = 2;
pub const HEADER_LIVES: usize = 3;
pub const HEADER_LEVEL: usize = 4;
pub const HEADER_AVATAR_ALIVE: usize = 5;
pub const HEADER_AVATAR_X: usize = 6;
pub const HEADER_AVATAR_Y: usize = 7;
pub const HEADER_AVATAR_HEADING: usize = 8;
pub const HEADER_AVATAR_HP: usize = 9;
pub const HEADER_SPRAY: usize = 10;
pub const HEADER_FLAME: usize = 11;

pub const FIELD_ID: usize = 0;
pub const FIELD_KIND: usize = 1;
pub const FIELD_X: usize = 2;
pub const FIELD_Y: usize = 3;
pub const FIELD_HEADING: usize = 4;
pub const FIELD_DEPTH: usize = 5;

pub const KIND_UNKNOWN: f32 = -1.0;
pub const KIND_PATROLLER: f32 = 0.0;
pub const KIND_HUNTER: f32 = 1.0;
pub const KIND_TRACKER: f32 = 2.0;
pub const KIND_PIT: f32 = 3.0;
pub const KIND_FOOD: f32 = 4.0;
pub const KIND_DIRT: f32 = 5.0;
pub const KIND_RESTORE_HEALTH: f32 = 6.0;
pub const KIND_FLAME_CHARGES: f32 = 7.0;
pub const KIND_EXTRA_LIFE: f32 = 8.0;
pub const KIND_FUNGUS: f32 = 9.0;
pub const KIND_SPRAY: f32 = 10.0;
pub const KIND_FLAME: f32 = 11.0;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

pub fn kind_code(kind: EntityKind) -> f32 {
    match kind {
        EntityKind::Microbe(MicrobeKind::Patroller) => KIND_PATROLLER,
        EntityKind::Microbe(MicrobeKind::Hunter) => KIND_HUNTER,
        EntityKind::Microbe(MicrobeKind::Tracker) => KIND_TRACKER,
        EntityKind::Pit => KIND_PIT,
        EntityKind::Food => KIND_FOOD,
        EntityKind::Dirt => KIND_DIRT,
        EntityKind::Pickup(PickupKind::RestoreHealth) => KIND_RESTORE_HEALTH,
        EntityKind::Pickup(PickupKind::FlameCharges) => KIND_FLAME_CHARGES,
        EntityKind::Pickup(PickupKind::ExtraLife) => KIND_EXTRA_LIFE,
        EntityKind::Pickup(PickupKind::Fungus) => KIND_FUNGUS,
        EntityKind::Projectile(ProjectileKind::Spray) => KIND_SPRAY,
        EntityKind::Projectile(ProjectileKind::Flame) => KIND_FLAME,
        EntityKind::Avatar => KIND_UNKNOWN,
    }
}

/// Kind code for a snapshot tag. Unknown tags map to [`KIND_UNKNOWN`].
#[inline]
pub fn tag_to_code(tag: &str) -> f32 {
    EntityKind::from_tag(tag).map_or(KIND_UNKNOWN, kind_code)
}

#[inline]
pub const fn entity_offset(index: usize) -> usize {
    HEADER_SIZE + index * ENTITY_STRIDE
}

#[inline]
pub fn calculate_buffer_size(entity_count: usize) -> usize {
    entity_offset(entity_count)
}

/// Entity count from a buffer header, `None` if the header is truncated.
#[inline]
pub fn parse_entity_count(buffer: &[f32]) -> Option<usize> {
    if buffer.len() < HEADER_SIZE {
        return None;
    }
    Some(buffer[HEADER_ENTITY_COUNT] as usize)
}

// ============================================================================
// MAIN SERIALIZATION FUNCTION
// ============================================================================

/// Packs a snapshot into the flat layout described above.
pub fn snapshot_to_flatbuffer(snapshot: &Snapshot) -> Vec<f32> {
    let count = snapshot.entities.len();
    let mut buffer = Vec::with_capacity(calculate_buffer_size(count));

    buffer.push(count as f32);
    buffer.push(snapshot.tick as f32);
    buffer.push(snapshot.score as f32);
    buffer.push(snapshot.lives as f32);
    buffer.push(snapshot.level as f32);
    match &snapshot.avatar {
        Some(a) => buffer.extend_from_slice(&[
            if a.alive { 1.0 } else { 0.0 },
            a.x,
            a.y,
            a.heading,
            a.hp as f32,
            a.spray_charges as f32,
            a.flame_charges as f32,
        ]),
        None => buffer.extend_from_slice(&[0.0; 7]),
    }

    for entity in &snapshot.entities {
        buffer.extend_from_slice(&[
            entity.id as f32,
            tag_to_code(&entity.tag),
            entity.x,
            entity.y,
            entity.heading,
            entity.depth as f32,
        ]);
    }

    debug_assert_eq!(buffer.len(), calculate_buffer_size(count), "Buffer size mismatch");
    buffer
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SimWorld;
    use crate::config::SimConfig;

    fn quiet_sim(seed: u64) -> SimWorld {
        SimWorld::with_config(SimConfig {
            random_pickups: false,
            ..SimConfig::seeded(seed)
        })
    }

    #[test]
    fn test_flatbuffer_empty() {
        let sim = SimWorld::new();
        let buffer = snapshot_to_flatbuffer(&sim.snapshot());
        assert_eq!(buffer.len(), HEADER_SIZE);
        assert_eq!(buffer[HEADER_ENTITY_COUNT], 0.0);
        assert_eq!(buffer[HEADER_AVATAR_ALIVE], 0.0);
    }

    #[test]
    fn test_flatbuffer_with_entities() {
        let mut sim = quiet_sim(1);
        sim.init_bare(2).unwrap();
        sim.spawn_microbe(MicrobeKind::Hunter, 10.0, 20.0);
        sim.spawn_food(50.0, 60.0);
        sim.spawn_pit(70.0, 80.0, [1, 1, 1]);

        let buffer = snapshot_to_flatbuffer(&sim.snapshot());
        assert_eq!(buffer.len(), calculate_buffer_size(3));
        assert_eq!(parse_entity_count(&buffer), Some(3));
        assert_eq!(buffer[HEADER_LEVEL], 2.0);
        assert_eq!(buffer[HEADER_LIVES], 3.0);
        assert_eq!(buffer[HEADER_AVATAR_ALIVE], 1.0);
        assert_eq!(buffer[HEADER_AVATAR_X], 0.0);
        assert_eq!(buffer[HEADER_AVATAR_HP], 100.0);
        assert_eq!(buffer[HEADER_SPRAY], 20.0);
        assert_eq!(buffer[HEADER_FLAME], 5.0);

        let o = entity_offset(0);
        assert_eq!(buffer[o + FIELD_KIND], KIND_HUNTER);
        assert_eq!(buffer[o + FIELD_X], 10.0);
        assert_eq!(buffer[o + FIELD_Y], 20.0);
        assert_eq!(buffer[o + FIELD_HEADING], 90.0);
        assert_eq!(buffer[o + FIELD_DEPTH], 0.0);

        let o = entity_offset(1);
        assert_eq!(buffer[o + FIELD_KIND], KIND_FOOD);
        assert_eq!(buffer[o + FIELD_DEPTH], 1.0);

        let o = entity_offset(2);
        assert_eq!(buffer[o + FIELD_KIND], KIND_PIT);
        assert_eq!(buffer[o + FIELD_X], 70.0);
    }

    #[test]
    fn test_flatbuffer_determinism() {
        let mut a = quiet_sim(77);
        let mut b = quiet_sim(77);
        a.init(1).unwrap();
        b.init(1).unwrap();
        for _ in 0..20 {
            a.advance_one_tick();
            b.advance_one_tick();
        }
        assert_eq!(snapshot_to_flatbuffer(&a.snapshot()), snapshot_to_flatbuffer(&b.snapshot()));
    }

    #[test]
    fn test_codes_are_distinct() {
        let mut codes: Vec<i32> = EntityKind::ALL
            .into_iter()
            .filter(|k| *k != EntityKind::Avatar)
            .map(|k| kind_code(k) as i32)
            .collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), EntityKind::ALL.len() - 1);
        assert_eq!(tag_to_code("unicorn"), KIND_UNKNOWN);
        assert_eq!(tag_to_code("fungus"), KIND_FUNGUS);
    }

    #[test]
    fn test_parse_entity_count_truncated() {
        assert_eq!(parse_entity_count(&[]), None);
        assert_eq!(parse_entity_count(&[1.0; HEADER_SIZE - 1]), None);
    }

    #[test]
    fn test_field_offsets_are_valid() {
        let fields = [FIELD_ID, FIELD_KIND, FIELD_X, FIELD_Y, FIELD_HEADING, FIELD_DEPTH];
        assert!(fields.iter().all(|&f| f < ENTITY_STRIDE));
        assert_eq!(ENTITY_STRIDE, FIELD_DEPTH + 1);
        assert_eq!(HEADER_SIZE, HEADER_FLAME + 1);
    }
}
